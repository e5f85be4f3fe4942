//! Manual smoke test: a bare readline loop against the real terminal.
//!
//! Run with `cargo run --bin tinyline-demo`. Type a line and press Enter;
//! Ctrl-D exits.

use tinyline::Session;

fn main() -> std::io::Result<()> {
    let mut session = Session::new(std::io::stdin(), std::io::stdout());
    loop {
        match session.readline("tinyline> ")? {
            Some(line) => println!("{line}"),
            None => break,
        }
    }
    Ok(())
}
