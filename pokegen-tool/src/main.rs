use clap::Parser;
use std::io::Write;

#[derive(clap::Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct Fields {
    /// Player name, up to 10 characters.
    #[clap(long)]
    player_name: Option<String>,

    /// Rival name, up to 10 characters.
    #[clap(long)]
    rival_name: Option<String>,

    /// Money, from 0 to 999999.
    #[clap(long)]
    money: Option<u64>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate a new save file.
    Gen {
        #[clap(default_value = "RED", long)]
        player_name: String,

        #[clap(default_value = "BLUE", long)]
        rival_name: String,

        #[clap(default_value = "3000", long)]
        money: u64,

        output_path: std::path::PathBuf,
    },

    /// Dump the variable fields of a save file.
    Inspect { path: std::path::PathBuf },

    /// Change fields of an existing save file and fix up its checksum.
    Edit {
        path: std::path::PathBuf,

        #[command(flatten)]
        fields: Fields,

        output_path: std::path::PathBuf,
    },
}

#[derive(serde::Serialize)]
struct Summary {
    player_name: String,
    rival_name: String,
    money: u64,
    checksum: u8,
    checksum_valid: bool,
}

pub fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    match args.command {
        Command::Gen {
            player_name,
            rival_name,
            money,
            output_path,
        } => cmd_gen(&player_name, &rival_name, money, output_path),
        Command::Inspect { path } => cmd_inspect(path),
        Command::Edit {
            path,
            fields,
            output_path,
        } => cmd_edit(path, fields, output_path),
    }
}

fn cmd_gen(player_name: &str, rival_name: &str, money: u64, output_path: std::path::PathBuf) -> Result<(), anyhow::Error> {
    let buf = pokegen::gen(player_name, rival_name, money)?;
    std::fs::write(&output_path, buf)?;
    Ok(())
}

fn summarize(save: &pokegen::save::Save) -> Result<Summary, anyhow::Error> {
    Ok(Summary {
        player_name: save.player_name()?,
        rival_name: save.rival_name()?,
        money: save.money()?,
        checksum: save.checksum(),
        checksum_valid: save.checksum() == save.compute_checksum(),
    })
}

fn cmd_inspect(path: std::path::PathBuf) -> Result<(), anyhow::Error> {
    let save = pokegen::save::Save::from_raw(&std::fs::read(&path)?)?;
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summarize(&save)?)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn cmd_edit(path: std::path::PathBuf, fields: Fields, output_path: std::path::PathBuf) -> Result<(), anyhow::Error> {
    let mut save = pokegen::save::Save::new(&std::fs::read(&path)?)?;
    if let Some(player_name) = fields.player_name {
        save.set_player_name(&player_name)?;
    }
    if let Some(rival_name) = fields.rival_name {
        save.set_rival_name(&rival_name)?;
    }
    if let Some(money) = fields.money {
        save.set_money(money)?;
    }
    save.rebuild_checksum();
    std::fs::write(&output_path, save.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["pokegen-tool", "gen", "--player-name", "Ash", "out.sav"]).unwrap();
        match args.command {
            Command::Gen {
                player_name,
                rival_name,
                money,
                output_path,
            } => {
                assert_eq!(player_name, "Ash");
                assert_eq!(rival_name, "BLUE");
                assert_eq!(money, 3000);
                assert_eq!(output_path, std::path::PathBuf::from("out.sav"));
            }
            _ => panic!("expected gen"),
        }
    }

    #[test]
    fn test_summarize() {
        let save = pokegen::save::Save::new(&pokegen::gen("Red", "Gary", 3000).unwrap()).unwrap();
        let summary = summarize(&save).unwrap();
        assert_eq!(summary.player_name, "Red");
        assert_eq!(summary.rival_name, "Gary");
        assert_eq!(summary.money, 3000);
        assert_eq!(summary.checksum, 0xc2);
        assert!(summary.checksum_valid);
    }

    #[test]
    fn test_summarize_reports_bad_checksum() {
        let mut buf = pokegen::gen("Red", "Gary", 3000).unwrap();
        buf[pokegen::layout::CHECKSUM_OFFSET] ^= 0xff;
        let save = pokegen::save::Save::from_raw(&buf).unwrap();
        let summary = summarize(&save).unwrap();
        assert_eq!(summary.player_name, "Red");
        assert_eq!(summary.checksum, 0x3d);
        assert!(!summary.checksum_valid);
    }

    #[test]
    fn test_inspect_corrupted_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.sav");
        let mut buf = pokegen::gen("RED", "BLUE", 3000).unwrap();
        buf[pokegen::layout::CHECKSUM_OFFSET] ^= 0xff;
        std::fs::write(&path, buf).unwrap();
        cmd_inspect(path.clone()).unwrap();
        assert!(cmd_edit(
            path,
            Fields {
                player_name: None,
                rival_name: None,
                money: None,
            },
            dir.path().join("out.sav"),
        )
        .is_err());
    }

    #[test]
    fn test_gen_and_edit() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.sav");
        let output = dir.path().join("out.sav");

        cmd_gen("RED", "BLUE", 3000, input.clone()).unwrap();
        cmd_edit(
            input.clone(),
            Fields {
                player_name: Some("Red".to_string()),
                rival_name: Some("Gary".to_string()),
                money: None,
            },
            output.clone(),
        )
        .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), pokegen::gen("Red", "Gary", 3000).unwrap());

        assert!(cmd_edit(
            input,
            Fields {
                player_name: None,
                rival_name: None,
                money: Some(1_000_000),
            },
            output,
        )
        .is_err());
    }
}
