use minter_cli::{command, options_from_matches, run};
use minter_test_utils::create_build_dir;

#[tokio::test]
async fn test_dry_run_hashes_real_images_offline() {
    let build = create_build_dir(2);
    let keys = tempfile::tempdir().unwrap();
    let matches = command()
        .try_get_matches_from([
            "paras-minter",
            "--api-url",
            "http://127.0.0.1:9",
            "--token-contract",
            "paras-token-v1.testnet",
            "--build-path",
            build.path().to_str().unwrap(),
            "--credentials-dir",
            keys.path().to_str().unwrap(),
            "--count",
            "2",
            "--dry-run",
        ])
        .unwrap();
    let options = options_from_matches(&matches).unwrap();

    let summary = run(options).await.unwrap();

    let titles: Vec<_> = summary.minted.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Avatar Example 1", "Avatar Example 2"]);
    assert!(summary.minted.iter().all(|m| m.tx_hash.is_none()));
}

#[tokio::test]
async fn test_missing_assets_fail_the_run() {
    let build = tempfile::tempdir().unwrap();
    let matches = command()
        .try_get_matches_from([
            "paras-minter",
            "--api-url",
            "http://127.0.0.1:9",
            "--token-contract",
            "paras-token-v1.testnet",
            "--build-path",
            build.path().to_str().unwrap(),
            "--credentials-dir",
            build.path().to_str().unwrap(),
            "--dry-run",
        ])
        .unwrap();
    let options = options_from_matches(&matches).unwrap();

    let err = run(options).await.unwrap_err();
    assert_eq!(minter_cli::exit_code_for(&err), 1);
    assert!(format!("{err:#}").contains("item 1"));
}
