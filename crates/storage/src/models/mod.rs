pub mod account;
pub mod partnership;
pub mod workout;

pub use account::{Account, AccountUpdate, NewAccount, Role};
pub use partnership::{Partnership, PartnershipStatus, Step, TrainerRequest};
pub use workout::{
    DescriptionPolicy, NewWorkout, Workout, WorkoutAccess, WorkoutChanges, WorkoutUpdate,
};
