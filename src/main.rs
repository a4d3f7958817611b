use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gas_density_calculator::{app::App, config, i18n, ui_cli::Terminal};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gas_density_calculator")]
#[command(about = "Gas mixture density calculator (ideal gas law, atm / °C / g/mol)", long_about = None)]
struct Cli {
    /// UI language: auto, en, ko
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
    /// Directory with <lang>.toml language packs
    #[arg(long)]
    locales: Option<PathBuf>,
    /// Config file path
    #[arg(long, default_value = config::CONFIG_PATH)]
    config: PathBuf,
    /// Pressure [atm]
    #[arg(short, long)]
    pressure: Option<String>,
    /// Temperature [°C]
    #[arg(short, long)]
    temperature: Option<String>,
    /// Gas percentage, e.g. --gas O2=21 --gas N2=79
    #[arg(short, long = "gas", value_name = "ID=PCT", value_parser = parse_gas_arg)]
    gases: Vec<(String, String)>,
    /// Start the interactive menu instead of a single calculation
    #[arg(short, long)]
    interactive: bool,
}

fn parse_gas_arg(s: &str) -> Result<(String, String), String> {
    let (gas, pct) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PCT, got '{s}'"))?;
    Ok((gas.trim().to_string(), pct.trim().to_string()))
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 한 번 계산하거나 대화형 메뉴를 실행한다.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match try_run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cfg = config::load_or_create(&cli.config)?;
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = i18n::Translator::new_with_pack(&lang, cli.locales.as_deref());
    let mut app = App::with_translator(cfg, cli.config, cli.locales, tr);
    let mut term = Terminal::stdio();

    let output = match app.apply_overrides(cli.pressure, cli.temperature, &cli.gases) {
        Err(err) => app.error_output(&err),
        Ok(()) if cli.interactive => {
            app.run(&mut term)?;
            return Ok(ExitCode::SUCCESS);
        }
        Ok(()) => app.calculate(),
    };
    app.print(&mut term, &output)?;
    Ok(if output.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
