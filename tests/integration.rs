use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn tqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tqa");
    path
}

const FRUIT: &str = "Item,Price,Color\nApple,10$/KG,Green\nGrape,5$/KG,Purple\n";

fn setup_test_env(config: &str) -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_path = config_dir.join("tqa.toml");
    fs::write(&config_path, config).unwrap();

    let table_path = root.join("fruit.csv");
    fs::write(&table_path, FRUIT).unwrap();

    (tmp, config_path, table_path)
}

fn run_tqa(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = tqa_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run tqa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_generate_writes_qa_table() {
    let (_tmp, config, table) = setup_test_env("");
    let (stdout, stderr, success) = run_tqa(&config, &["generate", table.to_str().unwrap()]);
    assert!(success, "generate failed: stderr={}", stderr);
    assert_eq!(
        stdout,
        "question,expected_answer\n\
         Apple的Price是什么？,10$/KG\n\
         Grape的Price是什么？,5$/KG\n\
         Apple的Color是什么？,Green\n\
         Grape的Color是什么？,Purple\n"
    );
}

#[test]
fn test_generate_custom_template_and_columns() {
    let (tmp, config, table) = setup_test_env("[questions]\ncolumns = [\"问题\", \"预期答案\"]\n");
    let out = tmp.path().join("out/qa.csv");
    let (_, stderr, success) = run_tqa(
        &config,
        &[
            "generate",
            table.to_str().unwrap(),
            "--template",
            "What is the $column_label of ${index_label}?",
            "--out",
            out.to_str().unwrap(),
        ],
    );
    assert!(success, "generate failed: stderr={}", stderr);
    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("问题,预期答案"));
    assert_eq!(lines.next(), Some("What is the Price of Apple?,10$/KG"));
}

#[test]
fn test_generate_rejects_unknown_placeholder() {
    let (_tmp, config, table) = setup_test_env("");
    let (_, stderr, success) = run_tqa(
        &config,
        &["generate", table.to_str().unwrap(), "--template", "$row?"],
    );
    assert!(!success);
    assert!(stderr.contains("unknown placeholder"), "stderr={}", stderr);
}

#[test]
fn test_decompose_json() {
    let (_tmp, config, table) = setup_test_env("");
    let (stdout, stderr, success) =
        run_tqa(&config, &["decompose", table.to_str().unwrap(), "--json"]);
    assert!(success, "decompose failed: stderr={}", stderr);
    let units: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(units.len(), 4);
    assert_eq!(units[0]["entity"], "Apple");
    assert_eq!(units[0]["attribute"], "Price");
    assert_eq!(units[3]["value"], "Purple");
}

#[test]
fn test_decompose_labeled_mini_tables() {
    let (_tmp, config, table) = setup_test_env("[table]\nentity_label = \"Item\"\n");
    let (stdout, _, success) = run_tqa(&config, &["decompose", table.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.starts_with("Item | Price\nApple | 10$/KG\n"));
}

#[test]
fn test_eval_memory_store_scores_every_cell() {
    let (_tmp, config, table) = setup_test_env("");
    let (stdout, stderr, success) = run_tqa(&config, &["eval", table.to_str().unwrap()]);
    assert!(success, "eval failed: stderr={}", stderr);
    assert_eq!(
        stdout,
        "question,expected_answer,actual_answer,actual_context\n\
         Apple的Price是什么？,10$/KG,10$/KG,\"(Apple, Price)\"\n\
         Grape的Price是什么？,5$/KG,5$/KG,\"(Grape, Price)\"\n\
         Apple的Color是什么？,Green,Green,\"(Apple, Color)\"\n\
         Grape的Color是什么？,Purple,Purple,\"(Grape, Color)\"\n"
    );
    assert!(stderr.contains("evaluation finished"));
}

#[test]
fn test_eval_json_report() {
    let (_tmp, config, table) = setup_test_env("[evaluation]\nconcurrency = 3\n");
    let (stdout, stderr, success) = run_tqa(
        &config,
        &["eval", table.to_str().unwrap(), "--format", "json"],
    );
    assert!(success, "eval failed: stderr={}", stderr);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["summary"]["total"], 4);
    assert_eq!(report["summary"]["exact_matches"], 4);
    assert_eq!(report["records"][1]["question"], "Grape的Price是什么？");
}

#[test]
fn test_ragged_table_fails() {
    let (tmp, config, _) = setup_test_env("");
    let bad = tmp.path().join("bad.csv");
    fs::write(&bad, "Item,Price,Color\nApple,1\n").unwrap();
    let (_, stderr, success) = run_tqa(&config, &["eval", bad.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("line 2"), "stderr={}", stderr);
}

#[test]
fn test_explicit_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");
    let (_, stderr, success) = run_tqa(&missing, &["query", "anything"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"), "stderr={}", stderr);
}

#[test]
fn test_query_memory_store_is_empty() {
    let (_tmp, config, _) = setup_test_env("");
    let (stdout, _, success) = run_tqa(&config, &["query", "Apple Price"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_explicit_default_config_path_must_exist() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("fruit.csv"), FRUIT).unwrap();

    let explicit = Command::new(tqa_binary())
        .current_dir(tmp.path())
        .args(["--config", "./config/tqa.toml", "generate", "fruit.csv"])
        .output()
        .unwrap();
    assert!(!explicit.status.success());
    assert!(String::from_utf8_lossy(&explicit.stderr).contains("Failed to read config file"));

    let implicit = Command::new(tqa_binary())
        .current_dir(tmp.path())
        .args(["generate", "fruit.csv"])
        .output()
        .unwrap();
    assert!(implicit.status.success());
}

#[test]
fn test_duplicate_columns_are_renamed() {
    let (tmp, config, _) = setup_test_env("");
    let dup = tmp.path().join("dup.csv");
    fs::write(&dup, "Item,Price,Price\nApple,1,2\n").unwrap();
    let (stdout, stderr, success) = run_tqa(&config, &["eval", dup.to_str().unwrap()]);
    assert!(success, "eval failed: stderr={}", stderr);
    assert!(stdout.contains("Apple的Price.1是什么？,2,2,\"(Apple, Price.1)\""), "stdout={}", stdout);
}
