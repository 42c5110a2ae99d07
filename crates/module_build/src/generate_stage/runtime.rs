/// Module registry every bundle starts with. `__externals` is declared right before it.
///
/// - `__modules[key]` holds `[factory, dependencies]`, where `dependencies` maps the specifiers a
///   module uses to registry keys.
/// - `__load` runs a factory once and caches its `module.exports`.
/// - `__export` defines ESM exports as getters, `__exportStar` copies them for `export *`.
/// - `__interop` gives CommonJS modules a `default` export.
pub const RUNTIME: &str = r#"const __modules = {};
const __cache = {};
function __load(key) {
  if (Object.prototype.hasOwnProperty.call(__externals, key)) return __externals[key];
  const cached = __cache[key];
  if (cached) return cached.exports;
  const record = __modules[key];
  if (!record) throw new Error("Cannot find module \"" + key + "\"");
  const [factory, dependencies] = record;
  const module = { exports: {} };
  __cache[key] = module;
  const require = (specifier) => __load(Object.prototype.hasOwnProperty.call(dependencies, specifier) ? dependencies[specifier] : specifier);
  factory.call(module.exports, module.exports, module, require);
  return module.exports;
}
function __export(target, getters) {
  Object.defineProperty(target, "__esModule", { value: true });
  for (const name in getters) Object.defineProperty(target, name, { get: getters[name], enumerable: true });
}
function __exportStar(target, source) {
  for (const name in source) {
    if (name !== "default" && !Object.prototype.hasOwnProperty.call(target, name)) {
      Object.defineProperty(target, name, { get: () => source[name], enumerable: true });
    }
  }
}
function __interop(value) {
  if (value && (value.__esModule || value[Symbol.toStringTag] === "Module")) return value;
  return Object.assign({}, value, { default: value });
}"#;
