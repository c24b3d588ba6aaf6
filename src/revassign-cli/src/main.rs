use clap::Parser;
use revassign_cli::{Cli, output};
use revassign_core::exit_codes;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    revassign_cli::init_logging(cli.log_level);

    let code = match revassign_cli::run(&cli).await {
        Ok(report) => {
            let rendered = if cli.json {
                output::render_json(&report)
            } else {
                Ok(output::render_text(&report))
            };
            match rendered {
                Ok(text) => {
                    print!("{text}");
                    if cli.json {
                        println!();
                    }
                    exit_codes::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: {err:#}");
                    exit_codes::RUNTIME_FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            revassign_cli::exit_code(&err)
        }
    };
    std::process::exit(code);
}
