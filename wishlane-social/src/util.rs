use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::UserData;

pub fn random_string(length: usize) -> String {
    let mut rng = thread_rng();

    std::iter::repeat(())
        .map(|_| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// The central guest guard. Every mutating social operation calls this at the
/// top, so the restriction is enforced in one place instead of per endpoint.
pub(crate) fn assert_not_guest<E>(user: &UserData, restricted: E) -> Result<(), E> {
    if user.is_guest {
        Err(restricted)
    } else {
        Ok(())
    }
}
