pub mod course;
pub mod department;
pub mod faculty;
pub mod program;
pub mod score;
pub mod student;

pub use course::Course;
pub use department::Department;
pub use faculty::Faculty;
pub use program::Program;
pub use score::ScoreRow;
pub use student::Student;
