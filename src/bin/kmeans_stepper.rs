//! Line-oriented driver for a k-means session.
//!
//! Reads commands from stdin and prints the session after each one, so the
//! algorithm can be followed from a terminal or scripted from a file.
//!
//! Usage: `kmeans-stepper [seed]`
//!
//! Commands:
//!   generate [n]                    sample n points (default 100)
//!   init <k> <method> [x,y ...]     random | furthest-first | kmeans++ | manual
//!   step                            one Lloyd iteration
//!   converge                        iterate until stable
//!   show                            print the current session
//!   reset                           drop dataset and centroids
//!   quit

use env_logger::Env;
use kmeans_stepper::{
    InitMethod, KMeansError, Point, Session, SessionConfig, Snapshot, DEFAULT_NUM_POINTS,
};
use std::env;
use std::io::{self, BufRead, Write};

const INIT_USAGE: &str = "usage: init <k> <method> [x,y ...]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [seed]", args[0]);
        std::process::exit(1);
    }

    let mut config = SessionConfig::new();
    if let Some(seed) = args.get(1) {
        config = config.with_seed(seed.parse()?);
    }
    let mut session = Session::with_config(config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.first().copied() {
            None => {}
            Some("quit") | Some("exit") => break,
            Some(cmd) => match run_command(&mut session, cmd, &words[1..]) {
                Ok(text) => println!("{}", text),
                Err(e) => println!("error: {}", e),
            },
        }

        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    Ok(())
}

fn run_command(session: &mut Session, cmd: &str, args: &[&str]) -> Result<String, KMeansError> {
    match cmd {
        "generate" => {
            let n = match args.first() {
                Some(s) => s
                    .parse()
                    .map_err(|_| KMeansError::InvalidNumPoints(s.to_string()))?,
                None => DEFAULT_NUM_POINTS,
            };
            Ok(render(&session.generate_dataset(n)?))
        }
        "init" => {
            let (k, method, coords) = match args {
                [k, method, coords @ ..] => (k, method, coords),
                _ => return Ok(INIT_USAGE.to_string()),
            };
            let k: usize = k.parse().map_err(|_| KMeansError::InvalidK(k.to_string()))?;
            let method: InitMethod = method.parse()?;
            let manual = if method == InitMethod::Manual {
                Some(parse_points(coords)?)
            } else {
                None
            };

            let report = session.initialize(k, method, manual)?;
            Ok(format!("{}\n{}", report.message, render(&report.snapshot)))
        }
        "step" => {
            let report = session.step()?;
            Ok(format!(
                "shift = {:.6}, reassigned = {}, converged = {}\n{}",
                report.shift,
                report.n_changed,
                report.converged,
                render(&report.snapshot)
            ))
        }
        "converge" => {
            let report = session.converge()?;
            Ok(format!(
                "{} ({} steps)\n{}",
                report.message,
                report.steps,
                render(&report.snapshot)
            ))
        }
        "show" => Ok(render(&session.snapshot())),
        "reset" => Ok(render(&session.reset())),
        other => Ok(format!("unknown command: {}", other)),
    }
}

fn parse_points(coords: &[&str]) -> Result<Vec<Point>, KMeansError> {
    coords
        .iter()
        .map(|pair| -> Result<Point, KMeansError> {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| KMeansError::InvalidCentroids(format!("expected x,y, got {}", pair)))?;
            let parse = |v: &str| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| KMeansError::InvalidCentroids(format!("not a number: {}", v)))
            };
            Ok(Point::new(parse(x)?, parse(y)?))
        })
        .collect()
}

fn render(snapshot: &Snapshot) -> String {
    let mut out = format!("state: {}", snapshot.state);

    if let Some(dataset) = &snapshot.dataset {
        out.push_str(&format!("\npoints: {}", dataset.len()));
    }
    if let (Some(k), Some(method)) = (snapshot.k, snapshot.method) {
        out.push_str(&format!(
            "\nk = {}, method = {}, iterations = {}",
            k, method, snapshot.iterations
        ));
    }
    if let (Some(centroids), Some(assignment)) = (&snapshot.centroids, &snapshot.assignment) {
        let sizes = assignment.cluster_sizes(centroids.len());
        for (c, size) in centroids.iter().zip(sizes) {
            out.push_str(&format!(
                "\n  cluster {}: ({:.3}, {:.3}), {} points",
                c.id + 1,
                c.x,
                c.y,
                size
            ));
        }
    }
    if let Some(inertia) = snapshot.inertia {
        out.push_str(&format!("\ninertia: {:.4}", inertia));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_arguments_prints_usage() {
        let mut session = Session::new();
        session.generate_dataset(10).unwrap();

        let incomplete: [&[&str]; 2] = [&[], &["3"]];
        for args in incomplete {
            assert_eq!(run_command(&mut session, "init", args).unwrap(), INIT_USAGE);
        }
        assert!(matches!(
            run_command(&mut session, "init", &["x", "random"]),
            Err(KMeansError::InvalidK(_))
        ));
        assert!(run_command(&mut session, "init", &["3", "random"]).is_ok());
    }
}
