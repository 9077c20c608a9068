use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection};

use crate::error::StoreError;
use crate::records::{Activity, BmiCategory, Gender, HydrationStatus, Medicine, User, WaterIntake};
use crate::tracker::medicine::DoseOutcome;
use crate::tracker::{
    ActivityForm, ActivityTotals, AppointmentForm, MedicineForm, MetricForm, ProfileForm, Tracker,
};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub type ApiReply = WithStatus<Json>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn success<T: Serialize>(message: &str, data: &T) -> ApiReply {
        Self::with_data(StatusCode::OK, message, data)
    }

    pub fn created<T: Serialize>(message: &str, data: &T) -> ApiReply {
        Self::with_data(StatusCode::CREATED, message, data)
    }

    pub fn error(code: StatusCode, message: &str) -> ApiReply {
        Self::send(code, "error", message, None)
    }

    fn with_data<T: Serialize>(code: StatusCode, message: &str, data: &T) -> ApiReply {
        match serde_json::to_value(data) {
            Ok(value) => Self::send(code, "success", message, Some(value)),
            Err(err) => {
                error!(error = %err, "failed to encode response body");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response")
            }
        }
    }

    fn send(code: StatusCode, status: &str, message: &str, data: Option<serde_json::Value>) -> ApiReply {
        let response = ApiResponse {
            status: status.to_string(),
            message: message.to_string(),
            data,
        };
        warp::reply::with_status(warp::reply::json(&response), code)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MedicineStatus {
    #[serde(flatten)]
    medicine: Medicine,
    taken_today: bool,
}

#[derive(Debug, Serialize)]
struct WaterStatus {
    #[serde(flatten)]
    intake: WaterIntake,
    percentage: f64,
    status: HydrationStatus,
}

impl From<WaterIntake> for WaterStatus {
    fn from(intake: WaterIntake) -> Self {
        WaterStatus {
            percentage: intake.percentage(),
            status: intake.status(),
            intake,
        }
    }
}

#[derive(Debug, Serialize)]
struct ActivityLog {
    activities: Vec<Activity>,
    today: ActivityTotals,
}

/// A user as shown to clients; never carries the password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    id: String,
    email: String,
    name: String,
    age: Option<u32>,
    gender: Option<Gender>,
    height: Option<f64>,
    weight: Option<f64>,
    bmi: Option<f64>,
    bmi_category: Option<BmiCategory>,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Profile {
            bmi: user.bmi(),
            bmi_category: user.bmi_category(),
            id: user.id,
            email: user.email,
            name: user.name,
            age: user.age,
            gender: user.gender,
            height: user.height,
            weight: user.weight,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaterAdjustRequest {
    change: i64,
}

#[derive(Debug, Deserialize)]
struct WaterGoalRequest {
    goal: u32,
}

fn store_failure(err: StoreError) -> ApiReply {
    error!(error = ?err, "storage failure");
    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
}

fn loaded<T: Serialize>(result: Result<T, StoreError>, message: &str) -> ApiReply {
    match result {
        Ok(data) => ApiResponse::success(message, &data),
        Err(err) => store_failure(err),
    }
}

fn created<T: Serialize>(result: Result<Option<T>, StoreError>, message: &str) -> ApiReply {
    match result {
        Ok(Some(data)) => ApiResponse::created(message, &data),
        Ok(None) => ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, "Missing required fields"),
        Err(err) => store_failure(err),
    }
}

fn deleted(result: Result<bool, StoreError>, what: &str) -> ApiReply {
    match result {
        Ok(true) => ApiResponse::send(StatusCode::OK, "success", &format!("{} deleted", what), None),
        Ok(false) => ApiResponse::error(StatusCode::NOT_FOUND, &format!("{} not found", what)),
        Err(err) => store_failure(err),
    }
}

pub struct RestApi {
    tracker: Tracker,
}

impl RestApi {
    pub fn new(tracker: Tracker) -> Self {
        RestApi { tracker }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
        self.metrics_routes()
            .or(self.medicine_routes())
            .unify()
            .or(self.water_routes())
            .unify()
            .or(self.activity_routes())
            .unify()
            .or(self.appointment_routes())
            .unify()
            .or(self.profile_routes())
            .unify()
            .or(self.summary_route())
            .unify()
            .recover(handle_rejection)
            .with(warp::trace::request())
    }

    fn with_tracker(&self) -> impl Filter<Extract = (Tracker,), Error = Infallible> + Clone {
        let tracker = self.tracker.clone();
        warp::any().map(move || tracker.clone())
    }

    fn metrics_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let list = warp::path!("users" / String / "metrics")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                loaded(tracker.metrics().list(&user_id), "Metrics loaded")
            });

        let record = warp::path!("users" / String / "metrics")
            .and(warp::post())
            .and(json_body::<MetricForm>())
            .and(self.with_tracker())
            .map(|user_id: String, form: MetricForm, tracker: Tracker| {
                created(tracker.metrics().record(&user_id, &form).map(Some), "Metric recorded")
            });

        let delete = warp::path!("users" / String / "metrics" / String)
            .and(warp::delete())
            .and(self.with_tracker())
            .map(|user_id: String, metric_id: String, tracker: Tracker| {
                deleted(tracker.metrics().delete(&user_id, &metric_id), "Metric")
            });

        list.or(record).unify().or(delete).unify()
    }

    fn medicine_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let list = warp::path!("users" / String / "medicines")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                let medicines = tracker.medicines();
                let statuses = medicines.list(&user_id).map(|list| {
                    list.into_iter()
                        .map(|medicine| MedicineStatus {
                            taken_today: medicines.is_taken_today(&medicine),
                            medicine,
                        })
                        .collect::<Vec<_>>()
                });
                loaded(statuses, "Medicines loaded")
            });

        let add = warp::path!("users" / String / "medicines")
            .and(warp::post())
            .and(json_body::<MedicineForm>())
            .and(self.with_tracker())
            .map(|user_id: String, form: MedicineForm, tracker: Tracker| {
                created(tracker.medicines().add(&user_id, &form), "Medicine added")
            });

        let taken = warp::path!("users" / String / "medicines" / String / "taken")
            .and(warp::post())
            .and(self.with_tracker())
            .map(|user_id: String, medicine_id: String, tracker: Tracker| {
                match tracker.medicines().mark_taken_once(&user_id, &medicine_id) {
                    Ok(DoseOutcome::Recorded(medicine)) => {
                        ApiResponse::success("Dose recorded", &medicine)
                    }
                    Ok(DoseOutcome::AlreadyTaken(medicine)) => ApiResponse::with_data(
                        StatusCode::CONFLICT,
                        "Dose already recorded today",
                        &medicine,
                    ),
                    Ok(DoseOutcome::NotFound) => {
                        ApiResponse::error(StatusCode::NOT_FOUND, "Medicine not found")
                    }
                    Err(err) => store_failure(err),
                }
            });

        let delete = warp::path!("users" / String / "medicines" / String)
            .and(warp::delete())
            .and(self.with_tracker())
            .map(|user_id: String, medicine_id: String, tracker: Tracker| {
                deleted(tracker.medicines().delete(&user_id, &medicine_id), "Medicine")
            });

        list.or(add).unify().or(taken).unify().or(delete).unify()
    }

    fn water_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let today = warp::path!("users" / String / "water")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                loaded(tracker.water().today(&user_id).map(WaterStatus::from), "Water loaded")
            });

        let adjust = warp::path!("users" / String / "water" / "adjust")
            .and(warp::post())
            .and(json_body::<WaterAdjustRequest>())
            .and(self.with_tracker())
            .map(|user_id: String, request: WaterAdjustRequest, tracker: Tracker| {
                loaded(
                    tracker.water().adjust(&user_id, request.change).map(WaterStatus::from),
                    "Water updated",
                )
            });

        let goal = warp::path!("users" / String / "water" / "goal")
            .and(warp::put())
            .and(json_body::<WaterGoalRequest>())
            .and(self.with_tracker())
            .map(|user_id: String, request: WaterGoalRequest, tracker: Tracker| {
                loaded(
                    tracker.water().set_goal(&user_id, request.goal).map(WaterStatus::from),
                    "Water goal updated",
                )
            });

        today.or(adjust).unify().or(goal).unify()
    }

    fn activity_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let list = warp::path!("users" / String / "activities")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                let activities = tracker.activities();
                let log = activities.list(&user_id).and_then(|list| {
                    Ok(ActivityLog {
                        activities: list,
                        today: activities.totals_today(&user_id)?,
                    })
                });
                loaded(log, "Activities loaded")
            });

        let log = warp::path!("users" / String / "activities")
            .and(warp::post())
            .and(json_body::<ActivityForm>())
            .and(self.with_tracker())
            .map(|user_id: String, form: ActivityForm, tracker: Tracker| {
                created(tracker.activities().log(&user_id, &form), "Activity logged")
            });

        let delete = warp::path!("users" / String / "activities" / String)
            .and(warp::delete())
            .and(self.with_tracker())
            .map(|user_id: String, activity_id: String, tracker: Tracker| {
                deleted(tracker.activities().delete(&user_id, &activity_id), "Activity")
            });

        list.or(log).unify().or(delete).unify()
    }

    fn appointment_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let schedule = warp::path!("users" / String / "appointments")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                loaded(
                    tracker.appointments().upcoming_and_past(&user_id),
                    "Appointments loaded",
                )
            });

        let book = warp::path!("users" / String / "appointments")
            .and(warp::post())
            .and(json_body::<AppointmentForm>())
            .and(self.with_tracker())
            .map(|user_id: String, form: AppointmentForm, tracker: Tracker| {
                created(tracker.appointments().schedule(&user_id, &form), "Appointment scheduled")
            });

        let delete = warp::path!("users" / String / "appointments" / String)
            .and(warp::delete())
            .and(self.with_tracker())
            .map(|user_id: String, appointment_id: String, tracker: Tracker| {
                deleted(tracker.appointments().delete(&user_id, &appointment_id), "Appointment")
            });

        schedule.or(book).unify().or(delete).unify()
    }

    fn profile_routes(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        let show = warp::path!("users" / String / "profile")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                profile_reply(tracker.profiles().find(&user_id), "Profile loaded")
            });

        let update = warp::path!("users" / String / "profile")
            .and(warp::put())
            .and(json_body::<ProfileForm>())
            .and(self.with_tracker())
            .map(|user_id: String, form: ProfileForm, tracker: Tracker| {
                profile_reply(
                    tracker.profiles().update_profile(&user_id, &form),
                    "Profile updated",
                )
            });

        show.or(update).unify()
    }

    fn summary_route(&self) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
        warp::path!("users" / String / "summary")
            .and(warp::get())
            .and(self.with_tracker())
            .map(|user_id: String, tracker: Tracker| {
                loaded(tracker.daily_summary(&user_id), "Summary loaded")
            })
    }
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: for<'de> Deserialize<'de> + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn profile_reply(result: Result<Option<User>, StoreError>, message: &str) -> ApiReply {
    match result {
        Ok(Some(user)) => ApiResponse::success(message, &Profile::from(user)),
        Ok(None) => ApiResponse::error(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => store_failure(err),
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<ApiReply, Infallible> {
    let reply = if rejection.is_not_found() {
        ApiResponse::error(StatusCode::NOT_FOUND, "Route not found")
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        warn!(error = %err, "rejected request body");
        ApiResponse::error(StatusCode::BAD_REQUEST, "Invalid request body")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        ApiResponse::error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        warn!(?rejection, "unhandled rejection");
        ApiResponse::error(StatusCode::BAD_REQUEST, "Bad request")
    };
    Ok(reply)
}
