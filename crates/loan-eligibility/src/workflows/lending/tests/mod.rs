mod common;
mod eligibility;
mod routing;
mod service;
