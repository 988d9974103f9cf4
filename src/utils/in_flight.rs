/// Holds a submit flag raised for as long as it lives.
///
/// The flag drops back to `false` when the guard goes out of scope, including
/// when the future holding it is dropped before completion.
pub struct InFlight<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlight<'a> {
    pub fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
