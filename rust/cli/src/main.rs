use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let code = pitboss_cli::run(args, &mut io::stdout(), &mut io::stderr());
    ExitCode::from(code as u8)
}
