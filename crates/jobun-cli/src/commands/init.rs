//! The `jobun init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create jobun.toml
    if std::path::Path::new("jobun.toml").exists() {
        println!("jobun.toml already exists, skipping.");
    } else {
        std::fs::write("jobun.toml", SAMPLE_CONFIG)?;
        println!("Created jobun.toml");
    }

    // Create a sample corpus file
    std::fs::create_dir_all("corpus")?;
    let sample_path = std::path::Path::new("corpus/sample.txt");
    if sample_path.exists() {
        println!("corpus/sample.txt already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_CORPUS)?;
        println!("Created corpus/sample.txt");
    }

    println!("\nNext steps:");
    println!("  1. Drop your own study notes into corpus/");
    println!("  2. Run: jobun extract corpus/sample.txt");
    println!("  3. Run: jobun drill corpus/sample.txt");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# jobun configuration

# Where the ledger and session history live.
data_dir = "./jobun-data"

# Days covered by `jobun drill --missed-within`.
recently_missed_days = 7

# Rounds per session unless --count says otherwise.
default_question_count = 10

[round]
countdown_ticks = 10
base_score = 10
bonus_per_tick = 1
mistype_penalty = 1

[weak]
accuracy_threshold = 60.0
min_attempts = 1

# Optional: a directory of per-law provision-body JSON documents, shown
# (with the article number masked) as the prompt during a drill.
# bodies_dir = "./bodies"

# Optional: a remote article-body service.
# article_api_url = "https://example.com/api"
"#;

const SAMPLE_CORPUS: &str = "\
通謀虚偽表示は無効だが、善意の第三者には対抗できない【民法94条2項】。
受領遅滞中の履行不能は債権者の責めに帰すべき事由による【民法413条の2】。
人を殺した者は死刑又は無期若しくは5年以上の拘禁刑【刑法199条】。
表現の自由は憲法21条が保障する。
取締役の資格等は【会社法331条】を参照。
";
