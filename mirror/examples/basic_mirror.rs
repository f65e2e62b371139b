//! Basic mirroring example demonstrating the mirror library

use std::error::Error;

use mirror::{LocalTransport, MirrorEngine, MirrorOptions, NullProgress};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Basic Mirror Example");
    println!("====================");

    // Create temporary directories standing in for the remote dataset and
    // two local releases
    let temp_dir = tempfile::TempDir::new()?;
    let remote = temp_dir.path().join("remote");
    let release1 = temp_dir.path().join("release1");
    let release2 = temp_dir.path().join("release2");

    tokio::fs::create_dir_all(remote.join("data")).await?;
    tokio::fs::write(remote.join("alu.fa"), b">alu\nACGTACGT\n").await?;
    tokio::fs::write(remote.join("data").join("seq1.txt"), b"first sequence").await?;
    tokio::fs::write(remote.join("data").join("seq2.txt"), b"second sequence").await?;

    println!("Remote dataset: {}", remote.display());
    println!();

    // First run: nothing to reuse, everything is downloaded
    let options = MirrorOptions {
        patterns: vec!["alu\\.fa".to_string(), "data/seq.*\\.txt".to_string()],
        ..Default::default()
    };
    let engine = MirrorEngine::new(options.clone())?;
    let mut transport = LocalTransport::new(&remote);
    let report = engine.run(&mut transport, &release1, &NullProgress).await?;
    println!(
        "First run:  {} downloaded, {} copied ({} bytes fetched)",
        report.downloaded, report.copied, report.bytes_downloaded
    );

    // Second run against the first release: everything is reused
    let engine = MirrorEngine::new(MirrorOptions {
        previous_root: Some(release1.clone()),
        ..options
    })?;
    let mut transport = LocalTransport::new(&remote);
    let report = engine.run(&mut transport, &release2, &NullProgress).await?;
    println!(
        "Second run: {} downloaded, {} copied ({} bytes fetched)",
        report.downloaded, report.copied, report.bytes_downloaded
    );

    Ok(())
}
