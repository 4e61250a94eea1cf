/* 3rd party libraries */
use clap::{Arg, Command};
use crossbeam_channel as cbc;
use std::io::BufRead;
use std::path::PathBuf;
use std::thread::spawn;

/* Custom libraries */
use api::models::{BuildingRequest, CarCallRequest, HallCallRequest, HallDirection};
use api::ElevatorService;

/* Modules */
mod api;
mod broadcaster;
mod car;
mod config;
mod dispatcher;
mod scheduler;
mod shared;


/* Main */
fn main() {
    env_logger::init();

    let matches = Command::new("elevator-dispatch")
        .about("Collective-control elevator bank simulator")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("floors")
                .long("floors")
                .takes_value(true)
                .help("Override the configured number of floors"),
        )
        .arg(
            Arg::new("cars")
                .long("cars")
                .takes_value(true)
                .help("Override the configured number of cars"),
        )
        .get_matches();

    // Load the configuration
    let config_path = PathBuf::from(matches.value_of("config").unwrap_or("config.toml"));
    let mut config = crate::unwrap_or_exit!(config::load_config(&config_path), "loading configuration");
    if let Some(floors) = matches.value_of("floors") {
        config.building.total_floors = crate::unwrap_or_exit!(floors.parse(), "parsing --floors");
    }
    if let Some(cars) = matches.value_of("cars") {
        config.building.car_count = crate::unwrap_or_exit!(cars.parse(), "parsing --cars");
    }

    // Start the service with the configured building
    let service = ElevatorService::new(config.car, config.dispatch);
    crate::unwrap_or_exit!(
        service.reconfigure_building(&BuildingRequest {
            total_floors: config.building.total_floors,
            car_count: config.building.car_count,
        }),
        "initialising building"
    );
    let mut frames = crate::unwrap_or_exit!(service.subscribe(), "subscribing to state updates");

    // Forward stdin lines to the command loop
    let (command_tx, command_rx) = cbc::unbounded::<String>();
    spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if command_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    println!("commands: call <floor> <U|D> | go <car> <floor> | status | building <floors> <cars> | quit");

    // Main loop: print state frames, execute commands
    loop {
        cbc::select! {
            recv(frames) -> frame => {
                match frame {
                    Ok(frame) => println!("{}", serde_json::to_string(&frame).unwrap_or_default()),
                    Err(_) => break,
                }
            }
            recv(command_rx) -> line => {
                match line {
                    Ok(line) => {
                        match handle_command(&service, line.trim()) {
                            Action::Continue => {}
                            Action::Resubscribe => {
                                frames = crate::unwrap_or_exit!(service.subscribe(), "re-subscribing after reconfiguration");
                            }
                            Action::Quit => break,
                        }
                    }
                    Err(_) => break,
                }
            }
        }
    }

    service.shutdown();
}

enum Action {
    Continue,
    Resubscribe,
    Quit,
}

fn handle_command(service: &ElevatorService, line: &str) -> Action {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return Action::Quit,
        ["status"] => match service.get_status() {
            Ok(status) => println!("{}", serde_json::to_string(&status).unwrap_or_default()),
            Err(e) => println!("error: {}", e),
        },
        ["call", floor, direction] => {
            let request = match (floor.parse::<i32>(), HallDirection::parse(direction)) {
                (Ok(floor), Ok(direction)) => HallCallRequest { floor, direction },
                (Err(_), _) => {
                    println!("error: {:?} is not a floor number", floor);
                    return Action::Continue;
                }
                (_, Err(e)) => {
                    println!("error: {}", e);
                    return Action::Continue;
                }
            };
            match service.submit_hall_call(&request) {
                Ok(response) => println!("assigned car {}", response.assigned_car_id),
                Err(e) => println!("error: {}", e),
            }
        }
        ["go", car_id, floor] => {
            let request = match (car_id.parse::<usize>(), floor.parse::<i32>()) {
                (Ok(car_id), Ok(floor)) => CarCallRequest { car_id, floor },
                _ => {
                    println!("error: usage is 'go <car> <floor>'");
                    return Action::Continue;
                }
            };
            match service.submit_car_call(&request) {
                Ok(()) => println!("ok"),
                Err(e) => println!("error: {}", e),
            }
        }
        ["building", floors, cars] => {
            let request = match (floors.parse::<i32>(), cars.parse::<usize>()) {
                (Ok(total_floors), Ok(car_count)) => BuildingRequest {
                    total_floors,
                    car_count,
                },
                _ => {
                    println!("error: usage is 'building <floors> <cars>'");
                    return Action::Continue;
                }
            };
            match service.reconfigure_building(&request) {
                Ok(()) => {
                    println!("building reconfigured");
                    return Action::Resubscribe;
                }
                Err(e) => println!("error: {}", e),
            }
        }
        _ => println!("unknown command: {}", line),
    }
    Action::Continue
}
