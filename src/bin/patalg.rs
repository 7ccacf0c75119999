//! Companion CLI: match paths against a pattern, compare two patterns'
//! languages, or print compiled-automaton stats. Mirrors the library's own
//! `cli` feature shape — same four crates (`clap`, `anyhow`, `walkdir`,
//! `rayon`+`thread_local`) for the same jobs as the teacher's
//! `codeowners-cli`.

use std::{
    fs::File,
    io::BufRead,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use thread_local::ThreadLocal;

use pattern_algebra::{check_containment, compile_source, matcher, normalize, CompileOptions, NormalizeContext};

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match paths (or every file under given roots) against a pattern.
    Match {
        pattern: String,
        paths: Vec<PathBuf>,
        #[arg(short = 'f', long = "paths-from")]
        paths_from_file: Option<PathBuf>,
    },
    /// Compare two patterns' languages: subset, superset, overlap, equality.
    Contains { a: String, b: String },
    /// Print compiled-automaton statistics for a pattern.
    Stats { pattern: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Match { pattern, paths, paths_from_file } => run_match(&pattern, paths, paths_from_file),
        Command::Contains { a, b } => run_contains(&a, &b),
        Command::Stats { pattern } => run_stats(&pattern),
    }
}

fn run_match(pattern_source: &str, paths: Vec<PathBuf>, paths_from_file: Option<PathBuf>) -> Result<()> {
    let compiled = compile_source(pattern_source, CompileOptions::default())
        .map_err(|e| anyhow!("compiling {pattern_source:?}: {e}"))?;
    let ctx = normalize_context();

    let path_iter: Box<dyn Iterator<Item = PathBuf> + Send> = if let Some(file) = paths_from_file {
        let file_handle = File::open(&file).map_err(|e| anyhow!("reading {:?}: {e}", file))?;
        let reader = std::io::BufReader::new(file_handle);
        Box::new(reader.lines().filter_map(|l| l.ok()).map(PathBuf::from))
    } else if paths.is_empty() {
        Box::new(walk_files("."))
    } else {
        Box::new(paths.into_iter().flat_map(|p| -> Box<dyn Iterator<Item = PathBuf>> {
            if p.is_dir() {
                Box::new(walk_files(p))
            } else {
                Box::new(std::iter::once(p))
            }
        }))
    };

    let tl = ThreadLocal::new();
    path_iter.par_bridge().for_each(|path| {
        let normalized = normalize::normalize(&path.to_string_lossy(), &ctx);
        let thread_local_pattern = tl.get_or(|| compiled.clone());
        if matcher::matches(&normalized, thread_local_pattern) {
            println!("{}", path.display());
        }
    });
    Ok(())
}

fn run_contains(a_src: &str, b_src: &str) -> Result<()> {
    let a = compile_source(a_src, CompileOptions::default()).map_err(|e| anyhow!("compiling {a_src:?}: {e}"))?;
    let b = compile_source(b_src, CompileOptions::default()).map_err(|e| anyhow!("compiling {b_src:?}: {e}"))?;
    let result = check_containment(&a, &b);

    println!("relationship:  {:?}", result.relationship);
    println!(
        "is_subset={}  is_superset={}  is_equal={}  has_overlap={}",
        result.is_subset, result.is_superset, result.is_equal, result.has_overlap
    );
    if let Some(path) = &result.counterexample {
        println!("counterexample (matches A, not B): {path}");
    }
    if let Some(path) = &result.reverse_counterexample {
        println!("reverse counterexample (matches B, not A): {path}");
    }
    for reason in &result.explanation.failure_reasons {
        println!("  - {reason}");
    }
    Ok(())
}

fn run_stats(pattern_source: &str) -> Result<()> {
    let compiled = compile_source(pattern_source, CompileOptions::default())
        .map_err(|e| anyhow!("compiling {pattern_source:?}: {e}"))?;
    println!("states:       {}", compiled.automaton.states.len());
    println!("deterministic: {}", compiled.automaton.is_deterministic);
    println!("min_segments: {}", compiled.min_segments);
    match compiled.max_segments {
        Some(max) => println!("max_segments: {max}"),
        None => println!("max_segments: unbounded"),
    }
    if compiled.pattern.has_errors() {
        for error in &compiled.pattern.errors {
            eprintln!("warning: {error}");
        }
    }
    Ok(())
}

fn normalize_context() -> NormalizeContext {
    let home_dir = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
    let cwd = std::env::current_dir().map(|p| p.to_string_lossy().into_owned()).unwrap_or_else(|_| "/".to_string());
    NormalizeContext { home_dir, cwd, project_root: None }
}

fn walk_files(root: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| !entry.path().starts_with("./.git"))
        .map(|entry| entry.into_path())
}
