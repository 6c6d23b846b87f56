//! Drive lfsh from a Rust program over an in-memory store and terminal.
//!
//! Run:  cargo run -p lfsh --example embed

use std::sync::Arc;

use lfsh::{MemoryStream, ShellBuilder, ShellResult};
use lfsh_core::MemoryStore;

fn print_capture(label: &str, out: &str) {
    println!("\n== {label} ==");
    if out.is_empty() {
        println!("<empty>");
    } else {
        print!("{out}");
    }
}

#[tokio::main]
async fn main() -> ShellResult<()> {
    let stream = MemoryStream::new();
    let input = stream.input();
    let output = stream.output();

    let mut shell = ShellBuilder::new(Arc::new(MemoryStore::new()))
        .stream(stream)
        .build();

    shell.execute("mkdir docs").await?;
    shell.execute("cd docs").await?;

    input.feed("Hello from lfsh!^Second line\x04");
    shell.execute("load hello.txt").await?;
    output.take();

    shell.execute("dir").await?;
    print_capture("dir", &output.take());

    shell.execute("type hello.txt").await?;
    print_capture("type", &output.take());

    shell.execute("type hello.txt hex").await?;
    print_capture("type hex", &output.take());

    if let Err(e) = shell.execute("cd nowhere").await {
        print_capture("error", &format!("{e}\n"));
    }

    shell.execute("tree /").await?;
    print_capture("tree", &output.take());

    Ok(())
}
