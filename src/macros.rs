/// Fails to compile if the trait can't be turned into a trait object, so that
/// breaking `Box<dyn Trait>` users is noticed at the definition site.
#[macro_export]
macro_rules! assert_trait_is_object_safe {
  ($($trait:tt)+) => {
    const _: Option<&dyn $($trait)+> = None;
  };
}
