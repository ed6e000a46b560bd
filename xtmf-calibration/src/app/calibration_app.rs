use super::CalibrationAppError;
use crate::{config::CalibrationConfig, host::CalibrationSummary};
use clap::{Parser, Subcommand};
use xtmf_calibration_core::model::ModelSystem;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CalibrationAppArguments {
    #[command(subcommand)]
    pub app: CalibrationApp,
}

#[derive(Subcommand)]
pub enum CalibrationApp {
    #[command(about = "calibrate the model system parameters against their targets")]
    Run {
        #[arg(help = "path to a .toml or .json calibration configuration")]
        configuration_file: String,
        #[arg(long, help = "override the number of iterations")]
        max_iterations: Option<usize>,
        #[arg(
            long,
            help = "override the calibration report file, relative to the input base directory"
        )]
        report: Option<String>,
        #[arg(long, help = "show a progress bar over the model runs")]
        progress: bool,
        #[arg(long, help = "write the calibration summary as JSON to this file")]
        summary_file: Option<String>,
    },
    #[command(about = "run the model once and report the distance to every target")]
    Evaluate {
        #[arg(help = "path to a .toml or .json calibration configuration")]
        configuration_file: String,
        #[arg(
            long,
            help = "override the calibration report file, relative to the input base directory"
        )]
        report: Option<String>,
    },
    #[command(about = "check the configuration and parameter bindings without running the model")]
    Validate {
        #[arg(help = "path to a .toml or .json calibration configuration")]
        configuration_file: String,
    },
}

pub fn run(app: &CalibrationApp) -> Result<(), CalibrationAppError> {
    match app {
        CalibrationApp::Run {
            configuration_file,
            max_iterations,
            report,
            progress,
            summary_file,
        } => {
            let mut config = read_configuration(configuration_file)?;
            if let Some(n) = max_iterations {
                config.calibration.max_iterations = *n;
            }
            if let Some(r) = report {
                config.calibration.calibration_report = Some(r.into());
            }
            config.calibration.show_progress |= *progress;
            let summary = calibrate(&config)?;
            write_summary(&summary, summary_file.as_deref())
        }
        CalibrationApp::Evaluate {
            configuration_file,
            report,
        } => {
            let mut config = read_configuration(configuration_file)?;
            config.calibration.just_compute_against_targets = true;
            config.calibration.max_iterations = 1;
            config.calibration.save_parameters = false;
            if let Some(r) = report {
                config.calibration.calibration_report = Some(r.into());
            }
            let summary = calibrate(&config)?;
            write_summary(&summary, None)
        }
        CalibrationApp::Validate { configuration_file } => {
            let config = read_configuration(configuration_file)?;
            let mut host = config.build_host()?;
            host.validate()?;
            log::info!(
                "configuration is valid: {} targets bound to {} parameters of '{}'",
                host.targets().len(),
                host.model().parameters().len(),
                host.model().name()
            );
            let resolved = toml::to_string_pretty(&config).map_err(|e| {
                CalibrationAppError::OutputError {
                    path: String::from("<stdout>"),
                    message: e.to_string(),
                }
            })?;
            println!("{resolved}");
            Ok(())
        }
    }
}

fn read_configuration(configuration_file: &String) -> Result<CalibrationConfig, CalibrationAppError> {
    log::info!("reading calibration configuration from {configuration_file}");
    Ok(CalibrationConfig::try_from(configuration_file)?)
}

fn calibrate(config: &CalibrationConfig) -> Result<CalibrationSummary, CalibrationAppError> {
    let mut host = config.build_host()?;
    let result = host.run();
    if config.calibration.show_progress {
        // end the progress bar's line
        eprintln!();
    }
    Ok(result?)
}

fn write_summary(summary: &CalibrationSummary, file: Option<&str>) -> Result<(), CalibrationAppError> {
    let output_error = |path: &str, message: String| CalibrationAppError::OutputError {
        path: path.to_string(),
        message,
    };
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| output_error("<summary>", e.to_string()))?;
    match file {
        Some(path) => {
            std::fs::write(path, &json).map_err(|e| output_error(path, e.to_string()))?;
            log::info!("wrote calibration summary to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    /// a one-parameter model: `out.txt` receives `10 + 2 * auto.constant`.
    fn write_project(dir: &Path) -> String {
        std::fs::write(dir.join("parameters.csv"), "name,value\nauto.constant,0\n").unwrap();
        let script = r#"awk -F, '$1=="auto.constant" {print 10 + 2*$2}' "$XTMF_PARAMETER_FILE" > out.txt"#;
        let config = serde_json::json!({
            "calibration": { "max_iterations": 2, "calibration_report": "calibration.csv" },
            "model": {
                "type": "command",
                "program": "sh",
                "args": ["-c", script],
                "working_directory": ".",
                "parameter_database": "parameters.csv",
                "run_parameter_file": "run.csv"
            },
            "targets": [{
                "name": "auto",
                "parameter_path": "auto.constant",
                "explore_size": 1.0,
                "minimum_value": -10.0,
                "maximum_value": 10.0,
                "measure": {
                    "type": "scalar",
                    "target": { "type": "constant", "value": 20.0 },
                    "observed": { "type": "text", "file": "out.txt" }
                }
            }]
        });
        let path = dir.join("calibration.json");
        std::fs::write(&path, config.to_string()).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_run_calibrates_command_model() {
        let dir = tempfile::tempdir().expect("temp dir");
        let configuration_file = write_project(dir.path());
        let summary_path = dir.path().join("summary.json");
        run(&CalibrationApp::Run {
            configuration_file,
            max_iterations: None,
            report: None,
            progress: false,
            summary_file: Some(summary_path.display().to_string()),
        })
        .expect("calibration succeeds");

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(summary["iterations_completed"], 2);
        assert_eq!(summary["jobs_per_iteration"], serde_json::json!([2, 2]));
        assert_eq!(summary["final_position"][0]["current"], 5.0);

        let saved = std::fs::read_to_string(dir.path().join("parameters.csv")).unwrap();
        assert_eq!(saved, "name,value\nauto.constant,5\n");
        let report = std::fs::read_to_string(dir.path().join("calibration.csv")).unwrap();
        assert_eq!(report.lines().count(), 3);
    }

    #[test]
    fn test_evaluate_does_not_save() {
        let dir = tempfile::tempdir().expect("temp dir");
        let configuration_file = write_project(dir.path());
        run(&CalibrationApp::Evaluate {
            configuration_file,
            report: Some(String::from("evaluation.csv")),
        })
        .expect("evaluation succeeds");
        let saved = std::fs::read_to_string(dir.path().join("parameters.csv")).unwrap();
        assert_eq!(saved, "name,value\nauto.constant,0\n");
        let report = std::fs::read_to_string(dir.path().join("evaluation.csv")).unwrap();
        assert_eq!(report.lines().nth(1), Some("0,-10,0"));
    }

    #[test]
    fn test_validate_reports_unbound_parameter() {
        let dir = tempfile::tempdir().expect("temp dir");
        let configuration_file = write_project(dir.path());
        std::fs::write(dir.path().join("parameters.csv"), "name,value\ntransit.constant,0\n").unwrap();
        match run(&CalibrationApp::Validate { configuration_file }) {
            Err(CalibrationAppError::CalibrationError(e)) => {
                assert!(e.to_string().contains("auto"), "{e}")
            }
            Err(other) => panic!("expected a validation error, found {other}"),
            Ok(()) => panic!("validation should fail"),
        }
    }
}
