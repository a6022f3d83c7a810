use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};
use courseplan::ac3::{Ac3, ConflictMode};
use courseplan::backtrack::{CancelToken, SearchLimits};
use courseplan::pso::BinaryPso;
use courseplan::slot::Slot;
use courseplan::{io, ConstraintMap};
use log::{debug, error, info, warn};
use std::time::Duration;

fn main() {
    env_logger::init();

    let matches = command!()
        .subcommand_required(true)
        .subcommand(
            Command::new("exact")
                .about("Enumerate all conflict-free schedules (AC-3 + backtracking)")
                .arg(arg!(<CATALOG> "Course catalog JSON file"))
                .arg(
                    arg!(-n --"no-class" <SLOT> "Forbid any offering in this slot, e.g. 'Monday 9-10'")
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-p --pick <ID> "Lock in a previously chosen offering id")
                        .action(ArgAction::Append),
                )
                .arg(arg!(--overlap "Detect conflicts by interval overlap instead of exact slot keys"))
                .arg(
                    arg!(--"max-nodes" <N> "Abort the enumeration after N candidate placements")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    arg!(--timeout <SECONDS> "Abort the enumeration after this many seconds")
                        .value_parser(value_parser!(u64)),
                )
                .arg(arg!(-o --output <FILE> "Write the solutions as JSON to this file")),
        )
        .subcommand(
            Command::new("swarm")
                .about("Search a student enrollment matrix with binary PSO")
                .arg(arg!(<PROBLEM> "Swarm problem JSON file")),
        )
        .get_matches();

    let status = match matches.subcommand() {
        Some(("exact", sub)) => run_exact(sub),
        Some(("swarm", sub)) => run_swarm(sub),
        _ => unreachable!(),
    };
    std::process::exit(status);
}

fn run_exact(matches: &ArgMatches) -> i32 {
    let path = matches.get_one::<String>("CATALOG").unwrap();
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("Could not open catalog file {}: {}", path, e);
            return exitcode::NOINPUT;
        }
    };
    let offerings = match io::catalog::read(file) {
        Ok(offerings) => offerings,
        Err(e) => {
            error!("Could not read catalog file {}: {}", path, e);
            return exitcode::DATAERR;
        }
    };
    info!("Read {} catalog records from {}", offerings.len(), path);
    let constraints = match ConstraintMap::build(&offerings) {
        Ok(map) => map,
        Err(e) => {
            error!("Invalid catalog data: {}", e);
            return exitcode::DATAERR;
        }
    };

    let mut no_class = Vec::<(String, String)>::new();
    for raw in matches
        .get_many::<String>("no-class")
        .unwrap_or_default()
    {
        // Validate the format early; the engine itself works on raw keys.
        if let Err(e) = Slot::parse(raw) {
            error!("Invalid --no-class value: {}", e);
            return exitcode::USAGE;
        }
        let normalized = courseplan::slot::normalize(raw);
        let (day, time) = normalized.split_once(' ').unwrap();
        no_class.push((day.to_owned(), time.to_owned()));
    }
    let picks: Vec<String> = matches
        .get_many::<String>("pick")
        .unwrap_or_default()
        .cloned()
        .collect();
    let mode = if matches.get_flag("overlap") {
        ConflictMode::IntervalOverlap
    } else {
        ConflictMode::ExactKey
    };
    let limits = SearchLimits {
        max_nodes: matches.get_one::<u64>("max-nodes").copied(),
        timeout: matches
            .get_one::<u64>("timeout")
            .map(|secs| Duration::from_secs(*secs)),
    };

    let ac3 = Ac3::new(&constraints, &picks, &no_class, mode);
    let (enumeration, trace) = ac3.solve(&limits, &CancelToken::new());
    for line in &trace {
        debug!("{}", line);
    }
    if !enumeration.complete {
        warn!(
            "Search stopped early after {} nodes; the solution set is incomplete",
            enumeration.nodes
        );
    }
    info!(
        "Found {} conflict-free schedules ({} nodes searched)",
        enumeration.solutions.len(),
        enumeration.nodes
    );
    print!("{}", io::format_solutions(&enumeration.solutions));

    if let Some(output) = matches.get_one::<String>("output") {
        let file = match std::fs::File::create(output) {
            Ok(file) => file,
            Err(e) => {
                error!("Could not create output file {}: {}", output, e);
                return exitcode::CANTCREAT;
            }
        };
        if let Err(e) = io::write_solutions(file, &enumeration.solutions) {
            error!("Could not write solutions to {}: {}", output, e);
            return exitcode::IOERR;
        }
        info!("Wrote solutions to {}", output);
    }
    exitcode::OK
}

fn run_swarm(matches: &ArgMatches) -> i32 {
    let path = matches.get_one::<String>("PROBLEM").unwrap();
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("Could not open problem file {}: {}", path, e);
            return exitcode::NOINPUT;
        }
    };
    let config = match io::swarm::read(file) {
        Ok(config) => config,
        Err(e) => {
            error!("Could not read problem file {}: {}", path, e);
            return exitcode::DATAERR;
        }
    };
    info!(
        "Optimizing enrollment of {} students in {} courses ({} particles, {} iterations)",
        config.num_students, config.num_courses, config.num_particles, config.max_iterations
    );

    let mut pso = match BinaryPso::new(config) {
        Ok(pso) => pso,
        Err(e) => {
            error!("Invalid swarm configuration: {}", e);
            return exitcode::DATAERR;
        }
    };
    let (best, fitness) = pso.run();
    print!("{}", io::format_enrollment(&best));
    print!("Best fitness: {}\n", fitness);
    exitcode::OK
}
