mod logger;
mod run;

fn main() {
    match run::run() {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            std::process::exit(1);
        }
    }
}
