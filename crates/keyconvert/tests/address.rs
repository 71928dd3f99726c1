use keyconvert::{
    Curve, KeyConvert, KeyKind, NativeProvider, config::KeyConvertConfig, format::Format,
};

const SCALAR_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const WIF_ONE: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";
const ADDRESS_ONE: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";

fn converter() -> KeyConvert {
    KeyConvert::new(
        KeyConvertConfig::builder(Curve::Secp256k1).build().unwrap(),
        NativeProvider::new(),
    )
}

#[tokio::test]
async fn scalar_one_vectors() {
    let mut kc = converter();
    kc.import(SCALAR_ONE.into(), Some(Format::Hex)).await.unwrap();

    let wif = kc.export(Format::Wif, KeyKind::Private, None).await.unwrap();
    assert_eq!(wif.as_text(), Some(WIF_ONE));
    assert_eq!(kc.derive_address().await.unwrap(), ADDRESS_ONE);
}

#[tokio::test]
async fn address_from_wif_import() {
    let mut kc = converter();
    kc.import(WIF_ONE.into(), Some(Format::Wif)).await.unwrap();

    assert_eq!(kc.private_key_hex().await.unwrap(), SCALAR_ONE);
    assert_eq!(kc.derive_address().await.unwrap(), ADDRESS_ONE);
}

#[tokio::test]
async fn address_is_stable() {
    let mut kc = converter();
    kc.generate().await.unwrap();

    let address = kc.derive_address().await.unwrap();
    assert!(address.starts_with('1'));
    assert_eq!(kc.derive_address().await.unwrap(), address);
}
