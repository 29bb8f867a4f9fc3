use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ward_core::{
    BoardFilter, CoreConfig, DepartmentBucket, DepartmentCoordinator, MoveIntent, PatientForm,
};
use ward_directory::{Department, HttpPatientDirectory, Patient, PatientId, Priority, StatusTrack};

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Department patient board CLI")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every department and its patients
    Board,
    /// Show patient totals per department
    Stats,
    /// Show the detail summary of one department
    Summary {
        /// Department name, e.g. "ICU" or "general-ward"
        department: Department,
    },
    /// Filter the board
    Search {
        /// Matches name, MRN, department or doctor
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        department: Option<Department>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Admit a new patient
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        nurse: String,
        #[arg(long)]
        bed: String,
        #[arg(long, default_value = "Emergency")]
        department: Department,
        #[arg(long, default_value = "Standard")]
        priority: Priority,
        #[arg(long, default_value = "Admission")]
        status: StatusTrack,
    },
    /// Edit a patient; omitted fields keep their current values
    Update {
        id: PatientId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        doctor: Option<String>,
        #[arg(long)]
        nurse: Option<String>,
        #[arg(long)]
        bed: Option<String>,
        #[arg(long)]
        department: Option<Department>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<StatusTrack>,
    },
    /// Discharge a patient from the board
    Delete { id: PatientId },
    /// Move a patient to another department
    Move {
        id: PatientId,
        #[arg(long)]
        to: Department,
        /// Position in the destination department (defaults to the end)
        #[arg(long)]
        index: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ward_cli=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'ward --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(CoreConfig::from_lookup(|key| std::env::var(key).ok())?);
    let directory = HttpPatientDirectory::new(cfg.api_base_url(), cfg.request_timeout())?;
    let coordinator = DepartmentCoordinator::new(directory, cfg);
    coordinator.load().await?;

    match command {
        Commands::Board => {
            let board = coordinator.board();
            if cli.json {
                print_json(&board)?;
            } else {
                print_buckets(board.buckets());
            }
        }
        Commands::Stats => {
            let stats = coordinator.department_stats();
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("Total patients: {}", coordinator.total_patients());
                for dept in stats {
                    println!(
                        "{:<12} {:>3} patients, {} critical, {} waiting",
                        dept.name, dept.count, dept.critical_count, dept.waiting_count
                    );
                }
            }
        }
        Commands::Summary { department } => {
            let summary = coordinator.department_summary(department);
            if cli.json {
                print_json(&summary)?;
            } else {
                println!("{}", summary.name);
                println!("  Patients:           {}", summary.count);
                println!("  Capacity:           {}", summary.capacity);
                println!("  Available:          {}", summary.available_capacity);
                println!("  Average wait (min): {}", summary.average_wait_minutes);
                println!("  Critical:           {}", summary.critical_count);
                println!("  Urgent:             {}", summary.urgent_count);
            }
        }
        Commands::Search {
            term,
            department,
            priority,
        } => {
            let filter = BoardFilter {
                search: term,
                department,
                priority,
            };
            let view = filter.apply(coordinator.board().buckets());
            if cli.json {
                print_json(&view)?;
            } else {
                print_buckets(&view);
            }
        }
        Commands::Create {
            name,
            doctor,
            nurse,
            bed,
            department,
            priority,
            status,
        } => {
            let form = PatientForm {
                name,
                status_track: Some(status),
                department: Some(department),
                priority: Some(priority),
                doctor_name: doctor,
                nurse_name: nurse,
                bed_number: bed,
            };
            let created = coordinator
                .create_patient(form.validate()?.into_new_patient())
                .await?;
            report(cli.json, "Created", &created)?;
        }
        Commands::Update {
            id,
            name,
            doctor,
            nurse,
            bed,
            department,
            priority,
            status,
        } => {
            let Some(existing) = coordinator.board().find(id).cloned() else {
                anyhow::bail!("patient {id} is not on the board");
            };
            let mut form = PatientForm::from_patient(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(doctor) = doctor {
                form.doctor_name = doctor;
            }
            if let Some(nurse) = nurse {
                form.nurse_name = nurse;
            }
            if let Some(bed) = bed {
                form.bed_number = bed;
            }
            form.department = department.or(form.department);
            form.priority = priority.or(form.priority);
            form.status_track = status.or(form.status_track);

            let updated = coordinator
                .update_patient(form.validate()?.apply_to(&existing))
                .await?;
            report(cli.json, "Updated", &updated)?;
        }
        Commands::Delete { id } => {
            coordinator.delete_patient(id).await?;
            announce(cli.json, Outcome::Deleted(id))?;
        }
        Commands::Move { id, to, index } => {
            let board = coordinator.board();
            let Some((from, _)) = board.locate(id) else {
                anyhow::bail!("patient {id} is not on the board");
            };
            let target_index = index.unwrap_or_else(|| board.bucket(to).len());
            match coordinator
                .move_patient(MoveIntent::new(id, from, to, target_index))
                .await?
            {
                Some(moved) => report(cli.json, "Moved", &moved)?,
                None => announce(cli.json, Outcome::Unmoved(id, to))?,
            }
        }
    }

    for record in coordinator.mutations() {
        tracing::debug!(?record, "mutation settled");
    }

    Ok(())
}

/// Result of a mutating command that has no patient record to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Deleted(PatientId),
    /// The patient was already in the requested department.
    Unmoved(PatientId, Department),
}

impl Outcome {
    fn to_json(self) -> serde_json::Value {
        match self {
            Outcome::Deleted(id) => serde_json::json!({ "deleted": id.0 }),
            Outcome::Unmoved(..) => serde_json::Value::Null,
        }
    }

    fn message(self) -> String {
        match self {
            Outcome::Deleted(id) => format!("Deleted patient {id}"),
            Outcome::Unmoved(id, department) => format!("Patient {id} is already in {department}"),
        }
    }
}

fn announce(json: bool, outcome: Outcome) -> anyhow::Result<()> {
    if json {
        return print_json(&outcome.to_json());
    }
    println!("{}", outcome.message());
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(json: bool, verb: &str, patient: &Patient) -> anyhow::Result<()> {
    if json {
        return print_json(patient);
    }
    println!("{verb} patient {}:", patient.id);
    print_patient(patient);
    Ok(())
}

fn print_patient(patient: &Patient) {
    println!(
        "  [{}] {} ({}) {} / {} / bed {} / {} / {} min",
        patient.id,
        patient.name,
        patient.mrn,
        patient.status_track,
        patient.priority,
        patient.bed_number,
        patient.doctor_name,
        patient.waiting_time
    );
}

fn print_buckets(buckets: &[DepartmentBucket]) {
    for bucket in buckets {
        println!("{} ({})", bucket.name, bucket.len());
        for patient in &bucket.patients {
            print_patient(patient);
        }
    }
}
