use std::process::exit;

use zlc_drv::{Config, Session};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {:#}", error);
            exit(99);
        },
    };

    let session = Session::new(config);

    let source = match session.read_source() {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: {:#}", error);
            exit(99);
        },
    };

    match session.compile(&source) {
        Ok(output) => print!("{}", output),
        Err(error) => {
            let _ = session.handler().emit_to(&mut std::io::stderr());
            exit(error.exit_code());
        },
    }
}
