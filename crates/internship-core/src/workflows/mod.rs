pub mod internship;
