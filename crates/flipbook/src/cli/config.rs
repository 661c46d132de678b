//! The `flipbook config` command for configuration management.

use clap::{Args, Subcommand};
use flipbook_core::Config;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the configuration and the settings a run would use
    Show,

    /// Show config file path
    Path,

    /// Write a config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,

        /// Output directory to record instead of the default
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            // Reload so a broken file is reported instead of replaced by defaults.
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
            println!("{}", describe_effective(&config)?);
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(not created yet, run `flipbook config init`)");
            }
        }

        ConfigCommand::Init { force, output_dir } => {
            let path = Config::default_path();
            let config = write_initial(&path, force, output_dir)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
            println!("Animations will be written to: {}", config.output_path().display());
        }
    }

    Ok(())
}

/// Resolved settings as TOML comments, so `show` output stays loadable.
fn describe_effective(config: &Config) -> anyhow::Result<String> {
    let scale = config.scale_policy()?;
    let playback = config.playback()?;
    let loops = if playback.loops_forever() {
        "loops forever".to_string()
    } else {
        format!("{} loop(s)", playback.loop_count)
    };

    Ok(format!(
        "# Effective settings\n\
         # output:   {}\n\
         # scale:    {} ({})\n\
         # playback: {} fps, {}ms per frame, {}",
        config.output_path().display(),
        scale.factor,
        scale.resize,
        playback.fps(),
        playback.frame_delay().as_millis(),
        loops
    ))
}

/// Write a default config to `path` and read it back through validation.
fn write_initial(path: &Path, force: bool, output_dir: Option<PathBuf>) -> anyhow::Result<Config> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut config = Config::default();
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;

    Ok(Config::load_from(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_settings_reflect_config() {
        let mut config = Config::default();
        config.output.dir = PathBuf::from("/srv/gifs");
        config.animation.fps = 10;
        config.animation.loop_count = 3;
        config.animation.scale_percent = 50;

        let text = describe_effective(&config).unwrap();
        assert!(text.contains("/srv/gifs/output.gif"), "{text}");
        assert!(text.contains("50% (exact)"), "{text}");
        assert!(text.contains("10 fps, 100ms per frame, 3 loop(s)"), "{text}");
        assert!(text.lines().all(|line| line.starts_with('#')));
    }

    #[test]
    fn init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = write_initial(&path, false, Some(PathBuf::from("/tmp/frames"))).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/frames"));
        assert_eq!(
            Config::load_from(&path).unwrap().output.dir,
            PathBuf::from("/tmp/frames")
        );
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[animation]\nfps = 7\n").unwrap();

        assert!(write_initial(&path, false, None).is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[animation]\nfps = 7\n"
        );

        let config = write_initial(&path, true, None).unwrap();
        assert_eq!(config.animation.fps, 2);
    }
}
