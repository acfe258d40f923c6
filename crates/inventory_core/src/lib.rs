pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    Assignment, AssignmentFilter, AssignmentView, CreateAssignment, Department, Device,
    DeviceType, Employee, NewAssignment, Role, UpdateAssignment, UserAccount, UserCredentials,
};
pub use ports::{
    AssignmentStore, DirectoryStore, NotificationSink, PortError, PortResult, UserStore,
};
pub use service::AssignmentService;
