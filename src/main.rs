use std::path::PathBuf;

use anyhow::Context;

use ninjashot::artifact;
use ninjashot::capture;
use ninjashot::config::{Config, ShortcutAction};
use ninjashot::domain::Rect;

enum Action {
    FullScreen { display: Option<usize> },
    Region(Rect),
    ListDisplays,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load();
    let action = parse_args(std::env::args().skip(1).collect(), &config)?;

    match action {
        Action::FullScreen { display } => {
            let bitmap = capture::capture_full_screen(display)
                .await
                .map_err(report_capture)?;
            let path = save(bitmap.as_png(), &config)?;
            println!("{}", path.display());
        }
        Action::Region(rect) => {
            let bitmap = capture::capture_region(rect, None)
                .await
                .map_err(report_capture)?;
            let path = save(bitmap.as_png(), &config)?;
            println!("{}", path.display());
        }
        Action::ListDisplays => {
            for display in capture::list_displays().await {
                println!("{}: {}", display.id, display.name);
            }
        }
    }
    Ok(())
}

fn parse_args(args: Vec<String>, config: &Config) -> anyhow::Result<Action> {
    let mut args = args.into_iter();
    match args.next().as_deref() {
        None => Ok(match config.shortcut_action {
            ShortcutAction::FullScreen => Action::FullScreen { display: None },
            ShortcutAction::Region => anyhow::bail!(
                "configured shortcut action is a region capture; run `ninjashot region X Y W H`"
            ),
        }),
        Some("full") => {
            let display = args
                .next()
                .map(|d| d.parse::<usize>().context("display must be a number"))
                .transpose()?;
            Ok(Action::FullScreen { display })
        }
        Some("region") => {
            let mut coord = |name: &str| -> anyhow::Result<f64> {
                args.next()
                    .with_context(|| format!("region requires X Y W H, missing {}", name))?
                    .parse::<f64>()
                    .with_context(|| format!("{} must be a number", name))
            };
            let rect = Rect::new(coord("X")?, coord("Y")?, coord("W")?, coord("H")?);
            Ok(Action::Region(rect))
        }
        Some("displays") => Ok(Action::ListDisplays),
        Some(other) => anyhow::bail!(
            "unknown command '{}'; expected full [DISPLAY], region X Y W H, or displays",
            other
        ),
    }
}

fn save(png: &[u8], config: &Config) -> anyhow::Result<PathBuf> {
    let dir = match &config.save_directory {
        Some(dir) => dir.clone(),
        None => artifact::default_screenshots_dir()?,
    };
    Ok(artifact::save_png(png, &dir)?)
}

/// Turn capture failures into messages with remediation hints
fn report_capture(err: capture::CaptureError) -> anyhow::Error {
    if let Some(dependency) = err.missing_dependency() {
        log::error!("{}", dependency.install_hint());
    }
    anyhow::Error::new(err)
}
