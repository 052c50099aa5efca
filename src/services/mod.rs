pub mod dashboard_service;
pub mod level_service;
pub mod quest_service;
pub mod report_service;
pub mod scorecard_service;
pub mod streak_service;
