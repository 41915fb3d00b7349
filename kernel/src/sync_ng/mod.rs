pub mod atomic_wait;
pub use atomic_wait::{atomic_wait, atomic_wake};
pub mod semaphore;
pub mod spinlock;
pub use semaphore::Semaphore;
pub use spinlock::{SpinLock, SpinLockGuard};
