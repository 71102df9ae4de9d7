use streebog::{Digest, Streebog256};
use unixcrypt::error::Error;
use unixcrypt::unix::{self, SaltStatus};
use unixcrypt::{CryptData, CryptOutput, YescryptBackend, YescryptParams};

struct Mixer;

impl YescryptBackend for Mixer {
    fn derive(&self, passwd: &[u8], salt: &[u8], params: &YescryptParams, out: &mut [u8]) -> unixcrypt::Result<()> {
        if params.n < 2 {
            return Err(Error::InvalidSetting);
        }
        let mut st = Streebog256::new();
        st.update(passwd);
        st.update(salt);
        st.update(&params.n.to_le_bytes());
        st.update(&params.r.to_le_bytes());
        out.copy_from_slice(&st.finalize()[..]);
        Ok(())
    }
}

#[test]
fn strong_vectors() {
    let mut vectors = vec![
        ("password", "$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe"),
        ("U*U", "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"),
        ("test", "$5$rounds=11858$WH1ABM5sKhxbkgCK$aTQsjPkz0rBsH3lQlJxw9HDTDXPKBxC0LlVeV69P.t1"),
    ];
    if cfg!(feature = "scrypt") {
        vectors.push(("pleaseletmein", "$7$C6..../....SodiumChloride$kBGj9fHznVYFQMEn/qDCfrDevf9YDtcDdKvEqHJLV8D"));
    }
    if cfg!(feature = "argon2") {
        vectors.push(("password", "$argon2id$v=19$m=256,t=2,p=1$c29tZXNhbHQ$nf65EOgLrQMR/uIPnA4rEsF5h7TKyQwu9U1bMCHGi/4"));
    }
    for (pass, hash) in vectors {
        assert_eq!(unix::crypt(pass, hash).unwrap(), hash);
        assert!(unix::verify(pass, hash));
        assert!(!unix::verify("wrong", hash));
    }
}

#[test]
#[cfg(feature = "weak-hashes")]
fn legacy_vectors() {
    for &(pass, hash) in &[
        ("test", "aZGJuE6EXrjEE"),
        ("password", "_Gl/.K0Ay.aosctsbJ1k"),
        ("U*U*U*U*", "_J9..CCCCXBrJUJV154M"),
        ("password", "$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0"),
        ("abc", "$3$$e0fba38268d0ec66ef1cb452d5885e53"),
        ("", "$3$$31d6cfe0d16ae931b73c59d7e0c089c0"),
    ] {
        assert_eq!(unix::crypt(pass, hash).unwrap(), hash);
        assert_eq!(unix::checksalt(hash), SaltStatus::Legacy);
    }
}

#[test]
#[cfg(not(feature = "weak-hashes"))]
fn legacy_refused() {
    assert_eq!(unix::crypt("test", "aZGJuE6EXrjEE"), Err(Error::AlgorithmDisabled));
    assert_eq!(unix::checksalt("$1$abc$"), SaltStatus::Disabled);
}

#[test]
fn generated_settings_round_trip() {
    let mut prefixes = vec![("$2b$", 4), ("$5$", 1000), ("$6$", 1000)];
    if cfg!(feature = "weak-hashes") {
        prefixes.extend_from_slice(&[("$1$", 0), ("$sha1", 1000), ("$md5", 0), ("_", 7), ("", 0), ("$3$", 0)]);
    }
    if cfg!(feature = "scrypt") {
        prefixes.push(("$7$", 6));
    }
    if cfg!(feature = "argon2") {
        prefixes.extend_from_slice(&[("$argon2i$", 1), ("$argon2id$", 1)]);
    }
    for (prefix, count) in prefixes {
        let setting = unix::gensalt(Some(prefix), count).unwrap();
        assert!(setting.starts_with(prefix), "{} from {:?}", setting, prefix);
        let hash = unix::crypt("correct horse", &setting).unwrap();
        assert!(hash.starts_with(&setting[..prefix.len()]));
        assert_eq!(unix::crypt("correct horse", &hash).unwrap(), hash);
        assert!(unix::verify("correct horse", &hash));
        assert!(!unix::verify("battery staple", &hash));
    }
}

#[test]
fn gensalt_rejects_bad_counts() {
    assert_eq!(unix::gensalt(Some("$2b$"), 3), Err(Error::InvalidArgument));
    assert_eq!(unix::gensalt(Some("$6$"), 1_000_000_000), Err(Error::InvalidArgument));
    if cfg!(feature = "weak-hashes") {
        assert_eq!(unix::gensalt(Some("$1$"), 7), Err(Error::InvalidArgument));
    }
    if cfg!(feature = "scrypt") {
        assert_eq!(unix::gensalt(Some("$7$"), 1), Err(Error::InvalidArgument));
        assert_eq!(unix::gensalt(Some("$7$"), 12), Err(Error::InvalidArgument));
    }
}

#[test]
fn rounds_change_the_hash() {
    for prefix in &["$5$", "$6$"] {
        let low = unix::crypt("correct horse", &format!("{}rounds=1000$saltsalt$", prefix)).unwrap();
        let high = unix::crypt("correct horse", &format!("{}rounds=5000$saltsalt$", prefix)).unwrap();
        assert!(low.starts_with(&format!("{}rounds=1000$saltsalt$", prefix)));
        assert!(high.starts_with(&format!("{}rounds=5000$saltsalt$", prefix)));
        assert_ne!(low.rsplit('$').next(), high.rsplit('$').next());
        assert!(unix::verify("correct horse", &low));
        assert!(unix::verify("correct horse", &high));
        assert!(!unix::verify("correct horse", &format!("{}{}", &high[..high.rfind('$').unwrap()], &low[low.rfind('$').unwrap()..])));
    }
}

#[test]
fn salts_differ() {
    let a = unix::gensalt(Some("$6$"), 0).unwrap();
    let b = unix::gensalt(Some("$6$"), 0).unwrap();
    assert_ne!(a, b);
    assert_ne!(unix::crypt("pw", &a).unwrap()[a.len()..], unix::crypt("pw", &b).unwrap()[b.len()..]);
}

#[test]
fn failure_tokens_never_match() {
    let mut data = CryptData::new();
    let mut out = CryptOutput::new();
    for setting in &["*0", "*1", "$2$", "$9$abc", "$6$rounds=$salt$", "$5$a:b$"] {
        assert!(unix::crypt_rn("pw", setting, &mut out, &mut data).is_err());
        assert!(out.as_str().starts_with('*'));
        assert_ne!(out.as_str(), *setting);
        assert!(!unix::verify("pw", out.as_str()));
    }
}

#[test]
fn yescrypt_through_dispatch() {
    let mut data = CryptData::new().with_yescrypt(Mixer);
    let mut out = CryptOutput::new();
    let setting = "$y$j9T$LdJMENpBABJJ3hIHjB1Bi.";
    unix::crypt_rn("pleaseletmein", setting, &mut out, &mut data).unwrap();
    let y = out.as_str().to_string();
    assert!(y.starts_with("$y$j9T$LdJMENpBABJJ3hIHjB1Bi.$"));
    unix::crypt_rn("pleaseletmein", &y, &mut out, &mut data).unwrap();
    assert_eq!(out.as_str(), y);

    unix::crypt_rn("pleaseletmein", "$gy$j9T$LdJMENpBABJJ3hIHjB1Bi.", &mut out, &mut data).unwrap();
    let gy = out.as_str().to_string();
    assert!(gy.starts_with("$gy$j9T$LdJMENpBABJJ3hIHjB1Bi.$"));
    assert_ne!(gy[31..], y[30..]);

    assert_eq!(unix::crypt("pleaseletmein", &y), Err(Error::AlgorithmDisabled));
    assert_eq!(unix::checksalt(&y), SaltStatus::Ok);
}

#[test]
#[cfg(all(feature = "obsolete-api", feature = "weak-hashes"))]
fn static_buffer() {
    let hash = unsafe { unix::crypt_static("password", "$1$5pZSV9va$") }.to_string();
    assert_eq!(unix::crypt("password", "$1$5pZSV9va$").ok(), Some(hash));
    let failed = unsafe { unix::crypt_static("password", "$2$") };
    assert_eq!(failed, "*0");
}
