use proptest::prelude::*;
use vpnhub_client::join_url;

proptest! {
    #[test]
    fn join_url_never_doubles_the_separator(
        base in "https?://[a-z]{1,12}(:[0-9]{2,5})?(/[a-z]{1,8}){0,2}/{0,2}",
        segments in proptest::collection::vec("[a-z0-9_-]{1,10}", 1..4),
        leading_slash in any::<bool>(),
    ) {
        let path = segments.join("/");
        let endpoint = if leading_slash { format!("/{path}") } else { path.clone() };
        let url = join_url(&base, &endpoint);
        let trimmed = base.trim_end_matches('/');

        prop_assert!(url.starts_with(trimmed));
        prop_assert_eq!(&url[trimmed.len()..], format!("/{path}"));
    }
}
