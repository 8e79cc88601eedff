//! Utility functions for the crate

/// Naming utilities used in logs and error messages
pub mod naming {
    /// Strips module paths from a fully qualified type name.
    ///
    /// # Examples
    ///
    /// ```
    /// use beanflow_core::utils::naming::simple_type_name;
    ///
    /// assert_eq!(simple_type_name("app::service::UserService"), "UserService");
    /// assert_eq!(simple_type_name("UserService"), "UserService");
    /// ```
    ///
    /// Generic types keep their arguments untouched and only lose the outer
    /// path, because the result must borrow from the input:
    ///
    /// ```
    /// use beanflow_core::utils::naming::simple_type_name;
    ///
    /// assert_eq!(
    ///     simple_type_name("alloc::vec::Vec<alloc::string::String>"),
    ///     "Vec<alloc::string::String>"
    /// );
    /// ```
    pub fn simple_type_name(full_name: &str) -> &str {
        let head_end = full_name.find('<').unwrap_or(full_name.len());
        let start = full_name[..head_end]
            .rfind("::")
            .map_or(0, |index| index + 2);
        &full_name[start..]
    }
}
