pub mod aerial;
pub mod collision;
pub mod finish;
pub mod input;
pub mod lanes;
pub mod npc;
pub mod obstacles;
pub mod propulsion;
pub mod weather;

pub use aerial::*;
pub use collision::*;
pub use finish::*;
pub use input::*;
pub use lanes::*;
pub use npc::*;
pub use obstacles::*;
pub use propulsion::*;
pub use weather::*;
