use clap::{Parser, Subcommand};
use lenscraft::sequencer::{AnimationSequencer, FileAssetLoader, Progress, TokioClock, follow_slides};
use lenscraft::theme::{self, SystemTheme};
use lenscraft::{config, logging, output, server, site};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "lenscraft")]
#[command(about = "Portfolio website server for a photography studio")]
#[command(long_about = "\
Portfolio website server for a photography studio

Serves the home, about, portfolio, and contact pages, the contact form
endpoint, the shared light/dark theme preference, and the hero capture
sequence as a live event stream.

Site structure:

  site/
  ├── config.toml          # Site config (optional, overrides stock defaults)
  └── public/
      ├── images/          # Hero, gallery, and portrait images → /images/
      └── assets/          # Favicon and other files → /assets/

Run 'lenscraft gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site directory
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server
    Serve {
        /// Address to listen on (overrides [server] bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Export every page as static HTML
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Show or flip the stored theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Play the hero capture sequence in the terminal
    Hero {
        /// Stop after this many slideshow slides (default: one per captured image)
        #[arg(long)]
        slides: Option<usize>,
    },
    /// Validate config and look for missing images
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark and store the choice
    Toggle,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json, cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve { bind } => {
            let config = config::load_config(&cli.site)?;
            server::serve(config, &cli.site, bind).await?;
        }
        Command::Build { output } => {
            let config = config::load_config(&cli.site)?;
            let preference = theme::open(&config.theme, &cli.site, &one_shot_platform());
            let public_dir = config.public_dir(&cli.site);
            let report = site::build(&config, &public_dir, &output, preference.read())?;
            output::print_build_output(&report, &output);
        }
        Command::Theme { action } => {
            let config = config::load_config(&cli.site)?;
            let site_dir = cli.site.clone();
            // The preference store is plain file IO.
            let (state, stored) = tokio::task::spawn_blocking(move || {
                let preference = theme::open(&config.theme, &site_dir, &one_shot_platform());
                if let ThemeAction::Toggle = action {
                    preference.toggle();
                }
                (preference.state(), preference.has_override())
            })
            .await?;
            output::print_theme_state(state, stored);
        }
        Command::Hero { slides } => {
            let config = config::load_config(&cli.site)?;
            play_hero(&config, &cli.site, slides).await;
        }
        Command::Check => {
            let config = config::load_config(&cli.site)?;
            let config_path = cli.site.join("config.toml");
            let config_file = config_path.exists().then(|| config_path.display().to_string());
            let report = site::check_assets(&config, &config.public_dir(&cli.site), config_file);
            output::print_check_output(&report);
            if report.missing() > 0 {
                return Err(format!("{} image(s) missing", report.missing()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Desktop theme read once; one-shot commands don't follow changes.
fn one_shot_platform() -> SystemTheme {
    SystemTheme::new(Duration::ZERO)
}

/// Run the sequence with real timers and print each transition until the
/// requested number of slides has been shown or Ctrl-C.
async fn play_hero(config: &config::SiteConfig, site_dir: &Path, slides: Option<usize>) {
    let total = config.hero.images.len();
    let slides = slides.unwrap_or(total.max(1));
    let mut sequencer = AnimationSequencer::new(
        config.hero.clone(),
        TokioClock,
        FileAssetLoader::new(config.public_dir(site_dir)),
    );
    sequencer.start();

    let follow = follow_slides(&sequencer, slides, |progress| match progress {
        Progress::Changed { prev, next } => output::print_hero_transition(prev, next, total),
        Progress::Held(snapshot) => output::print_held_slide(snapshot),
    });
    tokio::select! {
        _ = follow => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    sequencer.stop();
}
