//! The `examdesk init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examdesk.toml").exists() {
        println!("examdesk.toml already exists, skipping.");
    } else {
        std::fs::write("examdesk.toml", SAMPLE_CONFIG)?;
        println!("Created examdesk.toml");
    }

    std::fs::create_dir_all("drafts")?;
    let example_path = std::path::Path::new("drafts/example.toml");
    if example_path.exists() {
        println!("drafts/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DRAFT)?;
        println!("Created drafts/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point base_url in examdesk.toml at your backend");
    println!("  2. Run: examdesk validate --draft drafts/example.toml");
    println!("  3. Run: examdesk signin --username <you>");
    println!("  4. Run: examdesk create-exam --draft drafts/example.toml --class <class id>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examdesk configuration

base_url = "http://localhost:3001/"
timeout_secs = 30

# Refreshes allowed per request before a denial is reported
max_auth_retries = 4

# Where the refresh credential is kept (default ~/.config/examdesk/credentials.json)
# credential_path = "/path/to/credentials.json"

# Word that starts each question in pasted text
question_label = "Question"
"#;

const EXAMPLE_DRAFT: &str = r#"title = "Arithmetic warm-up"
time = 15

[score]
multichoices = 6.0
truefalse = 2.0
shortanswer = 2.0

[text]
multiple_choice = """
Question 1: What is 2+2? A. 3 B. 4 C. 5 D. 6
Question 2: Which number is prime? A. 4 B. 6 C. 7 D. 9
"""
true_false = """
Question 1: Decide for each statement. a) 3 is odd b) 10 is prime c) 0 is even d) 1 is prime
"""
short_answer = """
Question 1: What is 7 times 6?
"""

[[answers]]
question = 1
choice = "B"

[[answers]]
question = 2
choice = "C"

[[answers]]
question = 3
statements = [true, false, true, false]

[[answers]]
question = 4
text = "42"
"#;
