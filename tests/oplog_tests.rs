use shardkv::oplog::{execute_file, execute_stream, parse_log};
use shardkv::{BatchConfig, KvError, PipelineConfig, ShardedMapConfig};
use tempfile::{TempDir, tempdir};
use tokio::fs;

const SAMPLE_LOG: &str = "N 3
I 0 \"a\"
I 10 \"b\"
I 10 \"c\"
L 0
L 10

D 0
D 0
L 0
Q 4
L 10
";

const SAMPLE_RESULT: &str = "Using 3 threads to consume
[Success] inserted a at 0
[Success] inserted b at 10
[Error] failed to insert 10 at c
[Success] Found \"a\" from key 0
[Success] Found \"b\" from key 10
[Success] removed 0
[Error] failed to remove 0: value not found
[Error] failed to locate 0
[Error] malformed operation \"Q 4\": unknown operation 'Q'
[Success] Found \"b\" from key 10
";

fn small_config() -> BatchConfig {
    BatchConfig {
        map: ShardedMapConfig::new(10),
        pipeline: PipelineConfig::default(),
    }
}

#[test]
fn test_execute_stream_sample() {
    let out = execute_stream(SAMPLE_LOG, &small_config()).unwrap();
    assert_eq!(out, SAMPLE_RESULT);
}

#[test]
fn test_same_result_for_any_bucket_count() {
    for buckets in [1, 2, 7, 1000] {
        let config = BatchConfig {
            map: ShardedMapConfig::new(buckets),
            pipeline: PipelineConfig::default(),
        };
        assert_eq!(execute_stream(SAMPLE_LOG, &config).unwrap(), SAMPLE_RESULT);
    }
}

#[test]
fn test_missing_header_fails() {
    let err = execute_stream("I 1 \"a\"\n", &small_config()).unwrap_err();
    assert!(matches!(err, KvError::ParseError(_)));

    let err = execute_stream("", &small_config()).unwrap_err();
    assert!(matches!(err, KvError::ParseError(_)));
}

#[test]
fn test_zero_worker_header_fails() {
    assert!(parse_log("N 0\nL 1\n").is_err());
}

#[test]
fn test_config_from_json_applies() {
    let config = BatchConfig::from_json(
        r#"{"map": {"num_buckets": 3}, "pipeline": {"gate_timeout_ms": null}}"#,
    )
    .unwrap();
    assert_eq!(config.map.num_buckets, 3);
    assert_eq!(config.pipeline.gate_timeout_ms, None);

    assert_eq!(execute_stream(SAMPLE_LOG, &config).unwrap(), SAMPLE_RESULT);
}

async fn write_input(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("ops.log");
    fs::write(&path, text).await.unwrap();
    path
}

#[tokio::test]
async fn test_execute_file() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, SAMPLE_LOG).await;
    let output = dir.path().join("out").join("result.log");

    let report = execute_file(&input, &output, small_config(), None)
        .await
        .unwrap();

    assert_eq!(report.workers, 3);
    assert_eq!(report.operations, 10);
    assert_eq!(fs::read_to_string(&output).await.unwrap(), SAMPLE_RESULT);
}

#[tokio::test]
async fn test_execute_file_worker_override() {
    let dir = tempdir().unwrap();
    let input = write_input(&dir, SAMPLE_LOG).await;
    let output = dir.path().join("result.log");

    let report = execute_file(&input, &output, small_config(), Some(1))
        .await
        .unwrap();

    assert_eq!(report.workers, 1);
    let expected = SAMPLE_RESULT.replacen("Using 3", "Using 1", 1);
    assert_eq!(fs::read_to_string(&output).await.unwrap(), expected);
}

#[tokio::test]
async fn test_execute_file_keeps_tmp_named_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("ops.tmp");
    fs::write(&input, SAMPLE_LOG).await.unwrap();
    let output = dir.path().join("ops");

    execute_file(&input, &output, small_config(), None)
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&input).await.unwrap(), SAMPLE_LOG);
    assert_eq!(fs::read_to_string(&output).await.unwrap(), SAMPLE_RESULT);
}

#[tokio::test]
async fn test_execute_file_missing_input() {
    let dir = tempdir().unwrap();
    let err = execute_file(
        &dir.path().join("absent.log"),
        &dir.path().join("out.log"),
        small_config(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, KvError::IoError(_)));
    assert!(!dir.path().join("out.log").exists());
}
