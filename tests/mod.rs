mod helpers;

#[test]
fn fixtures_are_present_and_readable() {
    let methods = helpers::read_fixture("methods.csv");
    let latin1 = helpers::read_fixture("methods_latin1.csv");

    assert!(methods.starts_with(b"Method,r,R,Unit"));
    assert!(latin1.starts_with(b"Method,r,R,Unit"));
    assert!(std::str::from_utf8(&latin1).is_err());
}
