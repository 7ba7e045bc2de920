//! Tests for NativeArgv
//!
//! Covers the shape of the native buffer: count, content, terminators,
//! independence from the foreign strings, and NUL handling.

use argv_bridge::{BridgeError, NativeArgv, NulPolicy};

#[test]
fn test_count_matches_foreign_length() {
    let args = vec!["extract", "input.pdf", "output.txt"];
    let argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    assert_eq!(argv.argc(), 3);
    assert_eq!(argv.len(), 3);
    let copied: Vec<&[u8]> = argv.iter().map(|arg| arg.to_bytes()).collect();
    assert_eq!(copied, vec![&b"extract"[..], &b"input.pdf"[..], &b"output.txt"[..]]);
}

#[test]
fn test_each_argument_is_len_plus_one() {
    let args = ["", "a", "naïve", "日本語"];
    let argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    for (index, original) in args.iter().enumerate() {
        let bytes = argv.bytes_with_nul(index).unwrap();
        assert_eq!(bytes.len(), original.len() + 1);
        assert_eq!(&bytes[..original.len()], original.as_bytes());
        assert_eq!(bytes[original.len()], 0);
    }
}

#[test]
fn test_order_and_duplicates_preserved() {
    let args = ["-v", "-v", "b", "a"];
    let argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    let copied: Vec<String> = argv
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    assert_eq!(copied, vec!["-v", "-v", "b", "a"]);
}

#[test]
fn test_empty_list_has_real_table() {
    let args: Vec<String> = Vec::new();
    let mut argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    assert!(argv.is_empty());
    let (argc, raw) = argv.as_raw_parts();
    assert_eq!(argc, 0);
    assert!(!raw.is_null());
    unsafe {
        assert!((*raw).is_null());
    }
}

#[test]
fn test_copies_do_not_alias_foreign_storage() {
    let args = vec![String::from("input.pdf"), String::from("output.txt")];
    let argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    for (index, original) in args.iter().enumerate() {
        let copy = argv.get(index).unwrap();
        assert_eq!(copy.to_bytes(), original.as_bytes());
        assert_ne!(copy.as_ptr() as usize, original.as_ptr() as usize);
    }
}

#[test]
fn test_two_buffers_are_independent() {
    let args = ["same", "args"];
    let first = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();
    let second = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();

    assert_eq!(format!("{:?}", first), format!("{:?}", second));
    for index in 0..args.len() {
        assert_ne!(
            first.get(index).unwrap().as_ptr(),
            second.get(index).unwrap().as_ptr()
        );
    }
}

#[test]
fn test_interior_nul_rejected() {
    let args = ["ok", "bad\0arg"];
    let err = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap_err();
    assert_eq!(err, BridgeError::InteriorNul { index: 1, position: 3 });
}

#[test]
fn test_interior_nul_truncated() {
    let args = ["ok", "bad\0arg"];
    let argv = NativeArgv::from_foreign(&args, NulPolicy::Truncate).unwrap();

    assert_eq!(argv.argc(), 2);
    assert_eq!(argv.bytes_with_nul(1).unwrap(), b"bad\0");
}

#[test]
fn test_raw_pointers_match_copies() {
    let args = ["one", "two"];
    let mut argv = NativeArgv::from_foreign(&args, NulPolicy::Reject).unwrap();
    let (argc, raw) = argv.as_raw_parts();

    let seen: Vec<Vec<u8>> = (0..argc as usize)
        .map(|i| unsafe { std::ffi::CStr::from_ptr(*raw.add(i)) }.to_bytes().to_vec())
        .collect();
    assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec()]);
}
