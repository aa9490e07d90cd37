use std::process::ExitCode;

fn main() -> ExitCode {
    match daygrid_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("daygrid: {err:#}");
            ExitCode::FAILURE
        }
    }
}
