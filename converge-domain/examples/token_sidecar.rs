/// 令牌侧车（FileTokenStore）示例
/// 展示侧车路径推导、写穿保存、损坏容忍与读回
use converge_domain::change::ChangeToken;
use converge_domain::persist::{FileTokenStore, StoreDescriptor, TokenStore, sidecar_path};

fn main() {
    let store_path = std::env::temp_dir().join(format!("converge-example-{}.store", ulid::Ulid::new()));
    let descriptor = StoreDescriptor::builder()
        .store_id("main".to_string())
        .path(store_path.clone())
        .build();
    let token_store = FileTokenStore::for_descriptors(&[descriptor]);

    println!("侧车路径: {}", sidecar_path(&store_path).display());

    // 尚未保存过：缺失与损坏同样返回 None，调用方从保留日志起点重放
    assert_eq!(token_store.load("main"), None);

    let token = ChangeToken::from_sequence(42);
    token_store.save("main", &token).expect("save token");
    assert_eq!(token_store.load("main"), Some(token.clone()));
    println!("读回令牌: {:?}", token.as_bytes());

    // 人为写坏侧车：load 退化为 None，而不是失败
    std::fs::write(sidecar_path(&store_path), b"garbage").expect("corrupt sidecar");
    assert_eq!(token_store.load("main"), None);
    println!("损坏侧车被容忍，退化为重放");

    let _ = std::fs::remove_file(sidecar_path(&store_path));
}
