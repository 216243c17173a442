use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    let music_dir = match args.dir {
        Some(dir) => dir,
        None => default_music_dir()?,
    };
    spindle::app::run(&music_dir)
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--dir" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--dir requires a path");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--dir cannot be empty");
                }
                out.dir = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn default_music_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("no music folder given and HOME is not set; use --dir"))?;
    Ok(PathBuf::from(home).join("Music"))
}

fn print_help() {
    println!("Spindle");
    println!("  --dir <path>   Music folder to play (default: ~/Music)");
}
