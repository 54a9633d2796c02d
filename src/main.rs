use scom_speechlib::speechlib::manifest::content_digest;
use scom_speechlib::{BuildOptions, Manifest, Mismatch, SpeechLib};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: {program} <command> [args]

Commands:
  info <file>                       Show header fields and entry count
  list <file>                       List word code, offset, length and md5 per entry
  extract <file> <dir>              Write every entry to <dir>/<word code>.raw
  build <dir> <out> [options]       Build a container from <dir>/<word code>.raw clips
      --name <NAME>
      --version <VERSION>
      --timestamp <TIMESTAMP>       e.g. \"09/09/09 12:00\"
      --file-type <N>
  manifest <file> <prefix>          Write <prefix>.offsets.json and <prefix>.md5sums.json
  verify <file> <prefix>            Compare a container with its side-files";

fn usage(program: &str) -> ! {
    eprintln!("{}", USAGE.replace("{program}", program));
    process::exit(1);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("ERROR: {}", message);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("speechlib");
    if args.len() < 3 {
        usage(program);
    }

    let result = match (args[1].as_str(), &args[2..]) {
        ("info", [file]) => info(file),
        ("list", [file]) => list(file),
        ("extract", [file, dir]) => extract(file, dir),
        ("build", [dir, out, options @ ..]) => build(dir, out, &parse_build_options(options)),
        ("manifest", [file, prefix]) => manifest(file, prefix),
        ("verify", [file, prefix]) => verify(file, prefix),
        _ => usage(program),
    };

    if let Err(e) = result {
        fail(e);
    }
}

fn parse_build_options(args: &[String]) -> BuildOptions {
    let mut options = BuildOptions::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let Some(value) = iter.next() else {
            fail(format!("{} flag requires an argument.", flag));
        };
        match flag.as_str() {
            "--name" => options.name = value.clone().into_bytes(),
            "--version" => options.version = value.clone().into_bytes(),
            "--timestamp" => options.timestamp_raw = value.clone().into_bytes(),
            "--file-type" => {
                options.file_type = value
                    .parse()
                    .unwrap_or_else(|_| fail(format!("Invalid file type: {}", value)));
            }
            other => fail(format!("Unknown option: {}", other)),
        }
    }
    options
}

fn info(file: &str) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_file(file)?;

    println!("Speech library: {}", file);
    println!("{}", "=".repeat(60));
    println!("  Name: {}", lib.header.name_lossy());
    println!("  Version: {}", lib.header.version_lossy());
    match lib.header.timestamp {
        Some(ts) => println!("  Timestamp: {} ({})", lib.header.timestamp_lossy(), ts),
        None => println!("  Timestamp: {} (unparsed)", lib.header.timestamp_lossy()),
    }
    println!("  File type: {}", lib.header.file_type);
    println!("  First free: {}", lib.header.first_free);
    println!("\nImage header:");
    println!("  Index size: {:#x} ({} slots)", lib.image_header.index_size, lib.image_header.capacity());
    println!("  Max word: {}", lib.image_header.max_word);
    println!("\nEntries: {}", lib.len());
    println!("  Audio bytes: {}", lib.audio_data.total_len());
    Ok(())
}

fn list(file: &str) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_file(file)?;

    println!("{:>6}  {:>10}  {:>10}  md5", "word", "offset", "length");
    for (word_code, offset) in lib.index.iter() {
        let data = lib.get(word_code).unwrap_or_default();
        println!(
            "{:>6}  {:>10}  {:>10}  {}",
            word_code,
            offset,
            data.len(),
            content_digest(data)
        );
    }
    Ok(())
}

fn extract(file: &str, dir: &str) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_file(file)?;
    let count = lib.extract_to_directory(dir)?;
    println!("Extracted {} entries to {}", count, dir);
    Ok(())
}

fn build(dir: &str, out: &str, options: &BuildOptions) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_directory_with(dir, options)?;
    lib.write_file(out)?;
    println!(
        "Built {} from {} entries ({} bytes, max word {})",
        out,
        lib.len(),
        lib.header.first_free,
        lib.image_header.max_word
    );
    Ok(())
}

fn manifest(file: &str, prefix: &str) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_file(file)?;
    Manifest::from_library(&lib).write(prefix)?;
    println!("Wrote side-files for {} entries", lib.len());
    Ok(())
}

fn verify(file: &str, prefix: &str) -> scom_speechlib::Result<()> {
    let lib = SpeechLib::from_file(file)?;
    let mismatches = Manifest::read(prefix)?.verify(&lib);
    if mismatches.is_empty() {
        println!("OK: {} entries match", lib.len());
        return Ok(());
    }

    for mismatch in &mismatches {
        match mismatch {
            Mismatch::Offset { word_code, expected, found } => {
                println!("  word {}: offset expected {:?}, found {:?}", word_code, expected, found);
            }
            Mismatch::Digest { word_code, expected, found } => {
                println!("  word {}: md5 expected {:?}, found {:?}", word_code, expected, found);
            }
        }
    }
    fail(format!("{} mismatches", mismatches.len()));
}
