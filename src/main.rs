use std::process::{ExitCode, Termination};

pub enum Exit<T> {
    Ok,
    Err(T),
}

impl<T: Into<u8> + std::fmt::Display> Termination for Exit<T> {
    fn report(self) -> ExitCode {
        match self {
            Exit::Ok => ExitCode::SUCCESS,
            Exit::Err(err) => {
                eprintln!("Error: {}", err);
                let code: u8 = err.into();
                ExitCode::from(code)
            },
        }
    }
}

#[async_std::main]
async fn main() -> Exit<photo_gallery::Error> {
    match photo_gallery::main().await {
        Ok(_) => Exit::Ok,
        Err(err) => Exit::Err(err),
    }
}
