use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

fn participant(puuid: &str, champion: &str, win: bool) -> serde_json::Value {
    json!({
        "puuid": puuid,
        "championName": champion,
        "win": win,
        "perks": {"styles": []},
        "teamId": 100
    })
}

fn write_matches(dir: &Path, name: &str, ids: &[&str]) -> Result<()> {
    let matches: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "metadata": {"matchId": id},
                "info": {"participants": [
                    participant("me", "Ahri", true),
                    participant("them", "Zed", false)
                ]}
            })
        })
        .collect();
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(name), serde_json::to_vec(&matches)?)?;
    Ok(())
}

fn run_matchctl(results: &Path, work: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_matchctl"))
        .current_dir(work)
        .arg("--results-dir")
        .arg(results)
        .args(args)
        .env_remove("RIOT_API_KEY")
        .stdin(Stdio::null())
        .output()
        .context("spawn matchctl")
}

#[test]
fn process_writes_csv_for_saved_matches() -> Result<()> {
    let dir = tempdir()?;
    let results = dir.path().join("results");
    let user_dir = results.join("Some_Guy");
    write_matches(&user_dir, "matches_0_1.json", &["BR1_1"])?;
    write_matches(&user_dir, "matches_1_1.json", &["BR1_2"])?;

    let out = run_matchctl(
        &results,
        dir.path(),
        &["process", "--username", "Some Guy", "--puuid", "me"],
    )?;
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("# Matches: 2"));
    assert!(stdout.contains("Processed table shape: (4, 5)"));

    let csv = std::fs::read_to_string(user_dir.join("matches.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "puuid,championName,win,match_id,is_user");
    assert_eq!(lines[1], "me,Ahri,True,BR1_1,True");
    assert_eq!(lines[4], "them,Zed,False,BR1_2,False");
    Ok(())
}

#[test]
fn process_without_saved_matches_fails() -> Result<()> {
    let dir = tempdir()?;
    let out = run_matchctl(
        &dir.path().join("results"),
        dir.path(),
        &["process", "-u", "ghost", "--puuid", "x"],
    )?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
    Ok(())
}

#[test]
fn load_matches_requires_api_key() -> Result<()> {
    let dir = tempdir()?;
    let out = run_matchctl(
        &dir.path().join("results"),
        dir.path(),
        &["load-matches", "-u", "someone", "-c", "1"],
    )?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("RIOT_API_KEY"));
    Ok(())
}
