// Utility functions

use std::sync::{Mutex, MutexGuard};

/// Acquire a mutex lock, recovering from poisoning by returning the guard.
/// A panicked handler must not take the board or the chat session down with it.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lock_mutex_recover_after_poison() {
        let mutex = Arc::new(Mutex::new(5));
        let poisoner = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        let mut guard = lock_mutex_recover(&mutex);
        *guard += 1;
        assert_eq!(*guard, 6);
    }
}
