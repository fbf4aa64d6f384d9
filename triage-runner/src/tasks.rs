//! Hospital API tasks
//!
//! Every task issues exactly one request and classifies what came back.
//! View tasks succeed on status 200. Create tasks additionally need the
//! `OK: ID` marker in the body; the ID after it is kept in the user's session.

use crate::session::UserSession;
use rand::seq::IndexedRandom;
use rand::Rng;
use triage_core::{Attempt, Outcome};
use triage_http::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Marker the API writes into the body of a successful create
pub const CREATED_MARKER: &str = "OK: ID";

/// Body characters quoted in a failure reason
const SNIPPET_CHARS: usize = 64;

const DOCTOR_SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller",
];
const PROFESSIONS: &[&str] = &[
    "Cardiologist",
    "Surgeon",
    "Pediatrician",
    "Neurologist",
    "Oncologist",
];
const PATIENT_SURNAMES: &[&str] = &[
    "Doe", "Jane", "Anderson", "Taylor", "Thomas", "Moore", "Martin",
];

/// Entities the API can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Hospital,
    Doctor,
    Patient,
}

impl Entity {
    pub fn label(self) -> &'static str {
        match self {
            Entity::Hospital => "Hospital",
            Entity::Doctor => "Doctor",
            Entity::Patient => "Patient",
        }
    }
}

/// What a task does with its request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// GET a page; `label` prefixes the failure reason
    View { label: &'static str },
    /// POST a generated form
    Create(Entity),
}

/// A named, weighted behaviour a virtual user can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub name: &'static str,
    pub path: &'static str,
    pub weight: u32,
    pub kind: TaskKind,
}

impl Task {
    pub const fn view(name: &'static str, path: &'static str, weight: u32, label: &'static str) -> Self {
        Self {
            name,
            path,
            weight,
            kind: TaskKind::View { label },
        }
    }

    pub const fn create(name: &'static str, path: &'static str, weight: u32, entity: Entity) -> Self {
        Self {
            name,
            path,
            weight,
            kind: TaskKind::Create(entity),
        }
    }

    /// Build this task's single request
    pub fn request<R: Rng + ?Sized>(&self, session: &UserSession, rng: &mut R) -> HttpRequest {
        match self.kind {
            TaskKind::View { .. } => HttpRequest::get(self.path),
            TaskKind::Create(Entity::Hospital) => HttpRequest::post_form(self.path, hospital_form(rng)),
            TaskKind::Create(Entity::Doctor) => {
                HttpRequest::post_form(self.path, doctor_form(session, rng))
            }
            TaskKind::Create(Entity::Patient) => HttpRequest::post_form(self.path, patient_form(rng)),
        }
    }

    /// Classify what the request produced
    pub fn classify(&self, result: Result<HttpResponse, HttpError>) -> Classified {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                return Classified {
                    attempt: Attempt::transport_failure(format!(
                        "{} request failed: {}",
                        self.label(),
                        e
                    )),
                    created: None,
                }
            }
        };

        let status = Some(response.status);
        let length = response.len();

        match self.kind {
            TaskKind::View { label } => {
                let outcome = if response.is_ok() {
                    Outcome::Success
                } else {
                    Outcome::failure(format!("{} returned {}", label, response.status))
                };
                Classified {
                    attempt: Attempt::new(outcome, status, length),
                    created: None,
                }
            }
            TaskKind::Create(entity) => {
                let label = entity.label();
                if !response.is_ok() {
                    let reason = format!("{} creation failed: {}", label, response.status);
                    return Classified {
                        attempt: Attempt::new(Outcome::failure(reason), status, length),
                        created: None,
                    };
                }
                if !response.body.contains(CREATED_MARKER) {
                    let reason = format!(
                        "{} creation failed: {} ({})",
                        label,
                        response.status,
                        snippet(&response.body)
                    );
                    return Classified {
                        attempt: Attempt::new(Outcome::failure(reason), status, length),
                        created: None,
                    };
                }
                Classified {
                    attempt: Attempt::new(Outcome::Success, status, length),
                    created: parse_created_id(&response.body).map(|id| (entity, id)),
                }
            }
        }
    }

    /// Issue the request and classify it. Never fails; errors become outcomes.
    pub async fn execute<R: Rng + ?Sized>(
        &self,
        client: &dyn HttpClient,
        session: &mut UserSession,
        rng: &mut R,
    ) -> Attempt {
        let request = self.request(session, rng);
        let classified = self.classify(client.send(request).await);
        if let Some((entity, id)) = classified.created {
            session.remember(entity, id);
        }
        classified.attempt
    }

    fn label(&self) -> &'static str {
        match self.kind {
            TaskKind::View { label } => label,
            TaskKind::Create(entity) => entity.label(),
        }
    }
}

/// Classification of one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub attempt: Attempt,
    /// Entity and ID announced by a successful create
    pub created: Option<(Entity, u64)>,
}

/// The hospital API catalog, in selection order
pub fn hospital_tasks() -> Vec<Task> {
    vec![
        Task::view("view_main_page", "/", 10, "Main page"),
        Task::view("view_hospitals", "/hospital", 5, "Hospital list"),
        Task::create("create_hospital", "/hospital", 3, Entity::Hospital),
        Task::view("view_doctors", "/doctor", 5, "Doctor list"),
        Task::create("create_doctor", "/doctor", 3, Entity::Doctor),
        Task::view("view_patients", "/patient", 5, "Patient list"),
        Task::create("create_patient", "/patient", 4, Entity::Patient),
        Task::view("view_diagnoses", "/diagnosis", 3, "Diagnosis list"),
        Task::view(
            "view_doctor_patient_relations",
            "/doctor-patient",
            2,
            "Doctor-patient list",
        ),
    ]
}

/// Number following the created marker, e.g. `OK: ID 7 for X` gives 7
pub fn parse_created_id(body: &str) -> Option<u64> {
    let start = body.find(CREATED_MARKER)? + CREATED_MARKER.len();
    let digits: String = body[start..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(SNIPPET_CHARS).collect();
    if trimmed.chars().count() > SNIPPET_CHARS {
        out.push_str("...");
    }
    out
}

fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn hospital_form<R: Rng + ?Sized>(rng: &mut R) -> Vec<(&'static str, String)> {
    vec![
        ("name", format!("Test Hospital {}", rng.random_range(1000..=9999))),
        ("address", format!("{} Test Street", rng.random_range(1..=999))),
        ("beds_number", rng.random_range(50..=500).to_string()),
        ("phone", format!("+1-555-{}", rng.random_range(1000..=9999))),
    ]
}

fn doctor_form<R: Rng + ?Sized>(session: &UserSession, rng: &mut R) -> Vec<(&'static str, String)> {
    let hospital_id = session
        .random_id(Entity::Hospital, rng)
        .map(|id| id.to_string())
        .unwrap_or_default();
    vec![
        ("surname", pick(DOCTOR_SURNAMES, rng).to_string()),
        ("profession", pick(PROFESSIONS, rng).to_string()),
        ("hospital_ID", hospital_id),
    ]
}

fn patient_form<R: Rng + ?Sized>(rng: &mut R) -> Vec<(&'static str, String)> {
    let born_date = format!(
        "{}-{:02}-{:02}",
        rng.random_range(1950..=2010),
        rng.random_range(1..=12),
        rng.random_range(1..=28)
    );
    vec![
        ("surname", pick(PATIENT_SURNAMES, rng).to_string()),
        ("born_date", born_date),
        ("sex", pick(&["M", "F"], rng).to_string()),
        ("mpn", rng.random_range(100_000_000u32..=999_999_999).to_string()),
    ]
}
