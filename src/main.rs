#[macro_use]
extern crate lazy_static;

use clap::App;
use std::io::{self, prelude::*};
use std::process;

mod config;
mod posts;

fn main() {
    let mut app = App::new("Blog CLI")
        .bin_name("blog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Write blog posts through the blog API.")
        .subcommand(posts::command());
    let matches = app.clone().get_matches();

    tracing_subscriber::fmt().with_writer(io::stderr).init();

    match dotenv::dotenv() {
        Ok(path) => tracing::debug!("Configuration read from {}", path.display()),
        Err(ref e) if e.not_found() => tracing::debug!("no .env was found"),
        Err(e) => tracing::warn!("Couldn't read .env: {}", e),
    }

    let res = match matches.subcommand() {
        ("posts", Some(args)) => posts::run(args),
        _ => {
            app.print_help().ok();
            println!();
            Ok(())
        }
    };
    if let Err(e) = res {
        if !e.is_logged() {
            eprintln!("{}", e);
        }
        process::exit(1);
    }
}

pub fn ask_for<R: BufRead>(something: &str, input: &mut R) -> io::Result<String> {
    eprint!("{}: ", something);
    io::stderr().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    line.retain(|c| c != '\n' && c != '\r');
    Ok(line)
}
