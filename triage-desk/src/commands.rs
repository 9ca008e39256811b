//! 工作台命令解析

use crate::intake::AdmissionForm;
use std::str::FromStr;
use triage_core::TriageError;

pub const HELP: &str = "\
Commands:
  admit <name>|<age>|<disease>|<department>|<tier>   admit a patient
  treat                                              dispatch the next waiting patient
  undo                                               undo the most recent treatment
  patients                                           list every admitted patient
  search <text>                                      search by name or disease
  queue                                              show the waiting line
  history                                            show treatments, most recent first
  stats                                              show totals
  metrics                                            show Prometheus metrics
  help                                               show this help
  quit                                               save and exit";

/// 工作台命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Admit(AdmissionForm),
    Treat,
    Undo,
    Patients,
    Search(String),
    Queue,
    History,
    Stats,
    Metrics,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = TriageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "admit" | "add" => parse_admission(rest).map(Command::Admit),
            "treat" | "next" => Ok(Command::Treat),
            "undo" => Ok(Command::Undo),
            "patients" | "list" => Ok(Command::Patients),
            "search" => Ok(Command::Search(rest.to_string())),
            "queue" => Ok(Command::Queue),
            "history" => Ok(Command::History),
            "stats" => Ok(Command::Stats),
            "metrics" => Ok(Command::Metrics),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(TriageError::Validation(format!(
                "Unknown command '{}', type 'help' for a list",
                other
            ))),
        }
    }
}

fn parse_admission(rest: &str) -> Result<AdmissionForm, TriageError> {
    let fields: Vec<&str> = rest.split('|').collect();
    match fields.as_slice() {
        [name, age, disease, department, priority] => Ok(AdmissionForm {
            name: name.to_string(),
            age: age.to_string(),
            disease: disease.to_string(),
            department: department.to_string(),
            priority: priority.to_string(),
        }),
        _ => Err(TriageError::Validation(
            "Usage: admit <name>|<age>|<disease>|<department>|<tier>".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("treat".parse::<Command>().unwrap(), Command::Treat);
        assert_eq!("  UNDO ".parse::<Command>().unwrap(), Command::Undo);
        assert_eq!("queue".parse::<Command>().unwrap(), Command::Queue);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_search_keeps_query() {
        assert_eq!(
            "search  heart failure ".parse::<Command>().unwrap(),
            Command::Search("heart failure".to_string())
        );
        assert_eq!("search".parse::<Command>().unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_parse_admit() {
        let command = "admit Mary Ann|71|Heart failure|Cardiology|Emergency"
            .parse::<Command>()
            .unwrap();
        assert_eq!(
            command,
            Command::Admit(AdmissionForm {
                name: "Mary Ann".to_string(),
                age: "71".to_string(),
                disease: "Heart failure".to_string(),
                department: "Cardiology".to_string(),
                priority: "Emergency".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "admit Alice|34".parse::<Command>(),
            Err(TriageError::Validation(_))
        ));
        assert!(matches!(
            "discharge".parse::<Command>(),
            Err(TriageError::Validation(_))
        ));
    }
}
