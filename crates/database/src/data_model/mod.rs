pub mod waypoint;
